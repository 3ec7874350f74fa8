//! LED and sound outputs, busy-wait delay and sleep mode.
//!
//! LEDs sit on PC0-PC3, the piezo on PB0, all active high.

use core::convert::Infallible;

use avr_device::atmega328p::Peripherals;
use avr_device::interrupt;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use keypad_core::{Buzzer, Leds};

const LED_MASK: u8 = 0x0F; // PC0-PC3
const SOUND_BIT: u8 = 0x01; // PB0

/// SMCR: sleep enable, idle mode (timers and TWI keep running).
const SMCR_IDLE: u8 = 0x01;

/// One iteration of the delay loop is ~4 cycles, 500 ns at 8 MHz.
const NS_PER_LOOP: u32 = 500;

pub fn init_outputs(dp: &Peripherals) {
    dp.PORTC.ddrc.modify(|r, w| unsafe { w.bits(r.bits() | LED_MASK) });
    dp.PORTC.portc.modify(|r, w| unsafe { w.bits(r.bits() & !LED_MASK) });
    dp.PORTB.ddrb.modify(|r, w| unsafe { w.bits(r.bits() | SOUND_BIT) });
    dp.PORTB.portb.modify(|r, w| unsafe { w.bits(r.bits() & !SOUND_BIT) });
}

pub fn init_sleep(dp: &Peripherals) {
    dp.CPU.smcr.write(|w| unsafe { w.bits(SMCR_IDLE) });
}

/// One status LED, by bit index in PORTC.
pub struct LedPin(u8);

impl ErrorType for LedPin {
    type Error = Infallible;
}

impl OutputPin for LedPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        let dp = unsafe { Peripherals::steal() };
        let bit = 1 << self.0;
        dp.PORTC.portc.modify(|r, w| unsafe { w.bits(r.bits() & !bit) });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let dp = unsafe { Peripherals::steal() };
        let bit = 1 << self.0;
        dp.PORTC.portc.modify(|r, w| unsafe { w.bits(r.bits() | bit) });
        Ok(())
    }
}

/// The piezo line. Driven from both the scan tick and the main loop, so
/// every read-modify-write runs with interrupts off.
pub struct SoundPin;

impl ErrorType for SoundPin {
    type Error = Infallible;
}

impl OutputPin for SoundPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        interrupt::free(|_| {
            let dp = unsafe { Peripherals::steal() };
            dp.PORTB.portb.modify(|r, w| unsafe { w.bits(r.bits() & !SOUND_BIT) });
        });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        interrupt::free(|_| {
            let dp = unsafe { Peripherals::steal() };
            dp.PORTB.portb.modify(|r, w| unsafe { w.bits(r.bits() | SOUND_BIT) });
        });
        Ok(())
    }
}

/// Busy-wait delay calibrated for 8 MHz.
pub struct BusyDelay;

impl DelayNs for BusyDelay {
    fn delay_ns(&mut self, ns: u32) {
        for _ in 0..ns / NS_PER_LOOP {
            unsafe { core::arch::asm!("nop") };
        }
    }
}

pub fn leds() -> Leds<LedPin> {
    Leds::new([LedPin(0), LedPin(1), LedPin(2), LedPin(3)])
}

pub fn buzzer() -> Buzzer<SoundPin, BusyDelay> {
    Buzzer::new(SoundPin, BusyDelay)
}
