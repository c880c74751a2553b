use serde::{Deserialize, Serialize};

/// Compatibility switches for behavior that differs between CHIP-8 interpreters.
/// Missing fields deserialize to their defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Leave I pointing one past the last byte touched by FX55/FX65 (I += x + 1)
    pub increment_index_on_transfer: bool,
    /// Apply one timer tick after every cycle instead of waiting for the host
    pub couple_timers_to_cycles: bool,
    /// Seed for the CXNN random source; seeded from OS entropy when absent
    pub rng_seed: Option<u64>,
    /// Instructions executed per `run_frame`, i.e. per 60 Hz timer tick
    pub cycles_per_frame: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            increment_index_on_transfer: false,
            couple_timers_to_cycles: false,
            rng_seed: None,
            cycles_per_frame: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{ "rng_seed": 7 }"#).unwrap();

        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.cycles_per_frame, 10);
        assert!(!config.increment_index_on_transfer);
        assert!(!config.couple_timers_to_cycles);
    }

    #[test]
    fn serializes_every_switch() {
        let config = Config {
            increment_index_on_transfer: true,
            ..Config::default()
        };
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["increment_index_on_transfer"], true);
        assert_eq!(json["couple_timers_to_cycles"], false);
        assert_eq!(json["cycles_per_frame"], 10);
        assert!(json["rng_seed"].is_null());
    }
}
