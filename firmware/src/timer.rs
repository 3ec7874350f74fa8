//! Scan tick: Timer1 in CTC mode at `TICK_HZ`.
//!
//! 8 MHz / 64 = 125 kHz; at 75 Hz the compare matches every 1667 counts.

use avr_device::atmega328p::TC1;
use avr_device::interrupt;
use keypad_core::{matrix, TICK_HZ};

use crate::board;
use crate::matrix::PortMatrix;
use crate::shared::{KEYS, SCAN, SETTINGS};

const TCCR1B_CTC_DIV64: u8 = (1 << 3) | (1 << 1) | (1 << 0); // WGM12, CS11, CS10
const CPU_HZ: u32 = 8_000_000;
const PRESCALER: u32 = 64;
/// Counts per tick, rounded to nearest, minus one for CTC.
const OCR1A_TICK: u16 = ((CPU_HZ / PRESCALER + TICK_HZ as u32 / 2) / TICK_HZ as u32 - 1) as u16;
const OCIE1A: u8 = 1 << 1;

pub fn init(tc1: &TC1) {
    tc1.tccr1a.write(|w| unsafe { w.bits(0) });
    tc1.ocr1a.write(|w| unsafe { w.bits(OCR1A_TICK) });
    tc1.tccr1b.write(|w| unsafe { w.bits(TCCR1B_CTC_DIV64) });
    tc1.timsk1.write(|w| unsafe { w.bits(OCIE1A) });
}

#[avr_device::interrupt(atmega328p)]
fn TIMER1_COMPA() {
    let code = matrix::scan(&mut PortMatrix::take());

    let (event, sound) = interrupt::free(|cs| {
        let settings = SETTINGS.borrow(cs).get();
        let mut keys = KEYS.borrow(cs).borrow_mut();
        let event = SCAN
            .borrow(cs)
            .borrow_mut()
            .tick(code, settings.repeat, &mut *keys);
        (event, settings.sound)
    });

    // Clicks even when the queue was full.
    if event.is_some() && sound {
        let _ = board::buzzer().click();
    }
}
