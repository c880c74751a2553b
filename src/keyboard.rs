use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};

pub const NUM_KEYS: usize = 16;

/// Key's variants are the 16 keys from the CHIP-8's hexadecimal keyboard.
/// The recommended key mapping is:
///
/// Keypad                   Keyboard
/// +-+-+-+-+                +-+-+-+-+
/// |1|2|3|C|                |1|2|3|4|
/// +-+-+-+-+                +-+-+-+-+
/// |4|5|6|D|                |Q|W|E|R|
/// +-+-+-+-+       =>       +-+-+-+-+
/// |7|8|9|E|                |A|S|D|F|
/// +-+-+-+-+                +-+-+-+-+
/// |A|0|B|F|                |Z|X|C|V|
/// +-+-+-+-+                +-+-+-+-+
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Key {
    Key1,
    Key2,
    Key3,
    C,
    Key4,
    Key5,
    Key6,
    D,
    Key7,
    Key8,
    Key9,
    E,
    A,
    Key0,
    B,
    F,
}

impl Key {
    /// The hex value (0x0 - 0xF) the interpreter sees for this key
    pub fn index(self) -> usize {
        match self {
            Key::Key0 => 0x0,
            Key::Key1 => 0x1,
            Key::Key2 => 0x2,
            Key::Key3 => 0x3,
            Key::Key4 => 0x4,
            Key::Key5 => 0x5,
            Key::Key6 => 0x6,
            Key::Key7 => 0x7,
            Key::Key8 => 0x8,
            Key::Key9 => 0x9,
            Key::A => 0xA,
            Key::B => 0xB,
            Key::C => 0xC,
            Key::D => 0xD,
            Key::E => 0xE,
            Key::F => 0xF,
        }
    }

    pub fn from_index(idx: usize) -> Option<Key> {
        let key = match idx {
            0x0 => Key::Key0,
            0x1 => Key::Key1,
            0x2 => Key::Key2,
            0x3 => Key::Key3,
            0x4 => Key::Key4,
            0x5 => Key::Key5,
            0x6 => Key::Key6,
            0x7 => Key::Key7,
            0x8 => Key::Key8,
            0x9 => Key::Key9,
            0xA => Key::A,
            0xB => Key::B,
            0xC => Key::C,
            0xD => Key::D,
            0xE => Key::E,
            0xF => Key::F,
            _ => return None,
        };
        Some(key)
    }
}

/// Implemented by whatever the host uses to read its keyboard. The emulator asks
/// it for the full set of keys currently held down
pub trait AsKeyboard {
    fn keys_down(&self) -> Vec<Key>;
}

/// Contains the state (up or down) of the CHIP-8's 16 keys. Only the host
/// writes this; the interpreter only reads it
pub struct Keyboard {
    key_input: FixedBitSet, // bit i is set while key i is held down
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard {
            key_input: FixedBitSet::with_capacity(NUM_KEYS),
        }
    }

    /// Handle the key down event for one of the 16 possible keys
    pub fn handle_key_down(&mut self, k: Key) {
        self.key_input.insert(k.index());
    }

    /// Handle the key up event for one of the 16 possible keys
    pub fn handle_key_up(&mut self, k: Key) {
        self.key_input.set(k.index(), false);
    }

    /// Replace the whole key state with exactly the keys the host reports down
    pub fn update_keyboard(&mut self, keys_down: &[Key]) {
        self.key_input.clear();
        for k in keys_down {
            self.handle_key_down(*k);
        }
    }

    /// Return the bool value of the bit at the given index. Only the low nibble
    /// of `idx` is used, matching the 16 keys
    pub fn get_key_state(&self, idx: usize) -> bool {
        self.key_input[idx & 0xF]
    }

    /// The lowest numbered key currently held, if any
    pub fn first_key_down(&self) -> Option<u8> {
        self.key_input.ones().next().map(|idx| idx as u8)
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_index_round_trip() {
        for idx in 0..NUM_KEYS {
            let key = Key::from_index(idx).unwrap();
            assert_eq!(key.index(), idx);
        }
        assert_eq!(Key::from_index(16), None);
    }

    #[test]
    fn down_and_up() {
        let mut keyboard = Keyboard::new();
        assert_eq!(keyboard.first_key_down(), None);

        keyboard.handle_key_down(Key::C);
        assert!(keyboard.get_key_state(0xC));
        assert!(keyboard.get_key_state(0x1C));
        assert_eq!(keyboard.first_key_down(), Some(0xC));

        keyboard.handle_key_up(Key::C);
        assert!(!keyboard.get_key_state(0xC));
    }

    #[test]
    fn update_replaces_state() {
        let mut keyboard = Keyboard::new();
        keyboard.handle_key_down(Key::Key9);

        keyboard.update_keyboard(&[Key::Key1, Key::F]);

        assert!(!keyboard.get_key_state(0x9));
        assert!(keyboard.get_key_state(0x1));
        assert!(keyboard.get_key_state(0xF));
        assert_eq!(keyboard.first_key_down(), Some(0x1));
    }
}
