use std::time::{Duration, Instant};

/// Hz at which the delay and sound timers count down
pub const TIMER_HZ: u32 = 60;

/// Wall clock time between two timer ticks
pub const TIMER_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / TIMER_HZ as u64);

/// Tracks real time for a host loop so it can apply timer ticks at 60 Hz no
/// matter how many instructions it runs in between
pub struct TimerClock {
    last: Instant,
    carry: Duration, // time since `last` not yet converted into a tick
}

impl TimerClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        TimerClock {
            last: start,
            carry: Duration::from_secs(0),
        }
    }

    /// Number of whole ticks that have passed since the previous call
    pub fn ticks_elapsed(&mut self) -> u32 {
        self.ticks_since(Instant::now())
    }

    /// Number of whole ticks between the previous call and `now`. Leftover
    /// time is kept for the next call. An `now` earlier than the previous call
    /// yields 0
    pub fn ticks_since(&mut self, now: Instant) -> u32 {
        if now <= self.last {
            return 0;
        }

        let elapsed = (now.duration_since(self.last) + self.carry).as_nanos();
        let interval = TIMER_INTERVAL.as_nanos();
        self.last = now;
        self.carry = Duration::from_nanos((elapsed % interval) as u64);

        (elapsed / interval).min(u128::from(u32::MAX)) as u32
    }
}

impl Default for TimerClock {
    fn default() -> Self {
        Self::new()
    }
}
