//! 4x4 keypad firmware for ATmega328P at 8 MHz.
//!
//! - Matrix scan, debounce and auto-repeat from the Timer1 compare interrupt
//! - I2C slave on the TWI controller, serviced from its interrupt
//! - Commands handled in the main loop, which sleeps between interrupts
//! - Sound and auto-repeat flags persisted in EEPROM

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]

mod board;
mod eeprom;
mod i2c;
mod matrix;
mod shared;
mod timer;

use avr_device::atmega328p::Peripherals;
use keypad_core::{Dispatcher, Step};

use board::BusyDelay;
use eeprom::Eeprom;
use shared::Globals;

/// Panic handler: on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    matrix::init_gpio(&dp);
    board::init_outputs(&dp);

    // Sign of life before anything else runs.
    let mut leds = board::leds();
    let _ = leds.greet(&mut BusyDelay);

    let mut dispatcher = Dispatcher::new(leds, board::buzzer(), Eeprom);
    let mut globals = Globals;
    dispatcher.publish_settings(&mut globals);

    timer::init(&dp.TC1);
    i2c::init(&dp.TWI);
    board::init_sleep(&dp);

    unsafe { avr_device::interrupt::enable() };

    loop {
        let step = dispatcher.poll(&mut globals);
        let _ = dispatcher.check_overflow(&mut globals);

        // Only sleep once there is nothing left to do; the next scan tick
        // or bus event wakes us up again.
        if matches!(step, Ok(Step::Idle) | Ok(Step::Waiting)) {
            avr_device::asm::sleep();
        }
    }
}
