//! Settings storage in the on-chip EEPROM.

use avr_device::atmega328p::Peripherals;
use avr_device::interrupt;
use keypad_core::Storage;

// EECR bits
const EERE: u8 = 1 << 0;
const EEPE: u8 = 1 << 1;
const EEMPE: u8 = 1 << 2;

pub struct Eeprom;

impl Eeprom {
    fn wait_ready(dp: &Peripherals) {
        while dp.EEPROM.eecr.read().bits() & EEPE != 0 {}
    }
}

impl Storage for Eeprom {
    fn load(&mut self, slot: u8) -> u8 {
        let dp = unsafe { Peripherals::steal() };
        Self::wait_ready(&dp);
        dp.EEPROM.eear.write(|w| unsafe { w.bits(slot as u16) });
        dp.EEPROM.eecr.write(|w| unsafe { w.bits(EERE) });
        dp.EEPROM.eedr.read().bits()
    }

    fn store(&mut self, slot: u8, value: u8) {
        // Skip the erase/write cycle when nothing changes.
        if self.load(slot) == value {
            return;
        }

        let dp = unsafe { Peripherals::steal() };
        Self::wait_ready(&dp);
        dp.EEPROM.eear.write(|w| unsafe { w.bits(slot as u16) });
        dp.EEPROM.eedr.write(|w| unsafe { w.bits(value) });

        // EEPE must follow EEMPE within four cycles.
        interrupt::free(|_| {
            dp.EEPROM.eecr.write(|w| unsafe { w.bits(EEMPE) });
            dp.EEPROM.eecr.write(|w| unsafe { w.bits(EEMPE | EEPE) });
        });
    }
}
