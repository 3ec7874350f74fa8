//! Persistent user settings.
//!
//! Two flags, one byte each in non-volatile storage. A byte other than 0 or
//! 1 (fresh EEPROM reads 0xFF) is replaced by the default and written back.

use log::debug;

/// Storage slot of the click-sound flag.
pub const SOUND_SLOT: u8 = 0x10;
/// Storage slot of the auto-repeat flag.
pub const REPEAT_SLOT: u8 = 0x11;

/// Byte-addressed non-volatile storage.
pub trait Storage {
    fn load(&mut self, slot: u8) -> u8;
    fn store(&mut self, slot: u8, value: u8);
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn load(&mut self, slot: u8) -> u8 {
        (**self).load(slot)
    }

    fn store(&mut self, slot: u8, value: u8) {
        (**self).store(slot, value)
    }
}

/// RAM-backed storage that starts out erased, for running without EEPROM.
pub struct MemoryStorage {
    cells: [u8; 256],
}

impl MemoryStorage {
    pub const fn erased() -> Self {
        Self { cells: [0xFF; 256] }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::erased()
    }
}

impl Storage for MemoryStorage {
    fn load(&mut self, slot: u8) -> u8 {
        self.cells[slot as usize]
    }

    fn store(&mut self, slot: u8, value: u8) {
        self.cells[slot as usize] = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Click on every key event and beep on overflow.
    pub sound: bool,
    /// Auto-repeat held keys.
    pub repeat: bool,
}

impl Settings {
    pub const DEFAULT: Settings = Settings {
        sound: true,
        repeat: false,
    };

    /// Read both flags, repairing slots that hold garbage.
    pub fn load<S: Storage>(storage: &mut S) -> Self {
        Self {
            sound: load_flag(storage, SOUND_SLOT, Self::DEFAULT.sound),
            repeat: load_flag(storage, REPEAT_SLOT, Self::DEFAULT.repeat),
        }
    }

    pub fn set_sound<S: Storage>(&mut self, on: bool, storage: &mut S) {
        debug!("sound {}", if on { "on" } else { "off" });
        self.sound = on;
        storage.store(SOUND_SLOT, on as u8);
    }

    pub fn set_repeat<S: Storage>(&mut self, on: bool, storage: &mut S) {
        debug!("auto-repeat {}", if on { "on" } else { "off" });
        self.repeat = on;
        storage.store(REPEAT_SLOT, on as u8);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn load_flag<S: Storage>(storage: &mut S, slot: u8, default: bool) -> bool {
    match storage.load(slot) {
        0 => false,
        1 => true,
        _ => {
            storage.store(slot, default as u8);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erased_storage_gets_defaults() {
        let mut storage = MemoryStorage::erased();
        let settings = Settings::load(&mut storage);
        assert_eq!(settings, Settings::DEFAULT);
        assert_eq!(storage.load(SOUND_SLOT), 1);
        assert_eq!(storage.load(REPEAT_SLOT), 0);
    }

    #[test]
    fn test_stored_values_survive_reload() {
        let mut storage = MemoryStorage::erased();
        let mut settings = Settings::load(&mut storage);
        settings.set_sound(false, &mut storage);
        settings.set_repeat(true, &mut storage);

        let reloaded = Settings::load(&mut storage);
        assert!(!reloaded.sound);
        assert!(reloaded.repeat);
    }

    #[test]
    fn test_garbage_byte_is_repaired() {
        let mut storage = MemoryStorage::erased();
        storage.store(SOUND_SLOT, 0);
        storage.store(REPEAT_SLOT, 7);
        let settings = Settings::load(&mut storage);
        assert!(!settings.sound);
        assert!(!settings.repeat);
        assert_eq!(storage.load(REPEAT_SLOT), 0);
    }
}
