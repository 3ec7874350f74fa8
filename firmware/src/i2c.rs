//! TWI slave: address setup and the interrupt handler.
//!
//! The controller holds SCL low after every event until TWINT is written
//! back, so the handler always finishes by re-arming TWCR.

use avr_device::atmega328p::{self, Peripherals};
use avr_device::interrupt;
use keypad_core::{Control, Status, BUS_ADDRESS};

use crate::shared::BUS;

// TWCR bits
const TWINT: u8 = 1 << 7;
const TWEA: u8 = 1 << 6;
const TWSTO: u8 = 1 << 4;
const TWEN: u8 = 1 << 2;
const TWIE: u8 = 1 << 0;

/// Clear the interrupt flag and keep acknowledging our address.
const REARM: u8 = TWINT | TWEA | TWEN | TWIE;

/// Answer to `BUS_ADDRESS`; general calls are not enabled.
pub fn init(twi: &atmega328p::TWI) {
    twi.twar.write(|w| unsafe { w.bits(BUS_ADDRESS << 1) });
    twi.twcr.write(|w| unsafe { w.bits(REARM) });
}

#[avr_device::interrupt(atmega328p)]
fn TWI() {
    let dp = unsafe { Peripherals::steal() };
    let twi = &dp.TWI;

    let status = Status::from_raw(twi.twsr.read().bits());
    let data = twi.twdr.read().bits();

    let response = interrupt::free(|cs| BUS.borrow(cs).borrow_mut().on_status(status, data));

    if let Some(byte) = response.transmit {
        twi.twdr.write(|w| unsafe { w.bits(byte) });
    }

    let control = match response.control {
        Control::Ack => REARM,
        // STOP in slave mode only releases the lines; the controller stays
        // enabled and addressable.
        Control::Release => REARM | TWSTO,
    };
    twi.twcr.write(|w| unsafe { w.bits(control) });
}
