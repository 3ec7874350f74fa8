//! Keypad matrix wiring on PORTD.
//!
//! Rows PD0-PD3 are outputs, idle high. Columns PD4-PD7 are inputs with
//! pull-ups, so a pressed key pulls its column low while its row is driven.

use avr_device::atmega328p::Peripherals;
use keypad_core::matrix::MatrixIo;

const ROW_MASK: u8 = 0x0F;
const COL_MASK: u8 = 0xF0;
const COL_SHIFT: u8 = 4;

pub fn init_gpio(dp: &Peripherals) {
    let portd = &dp.PORTD;

    // Rows: output, drive high
    portd.ddrd.modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK) });
    portd.portd.modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK) });

    // Columns: input with pull-up
    portd.ddrd.modify(|r, w| unsafe { w.bits(r.bits() & !COL_MASK) });
    portd.portd.modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK) });
}

/// Direct register access to the matrix port. Only used from the scan
/// interrupt.
pub struct PortMatrix {
    dp: Peripherals,
}

impl PortMatrix {
    pub fn take() -> Self {
        Self {
            dp: unsafe { Peripherals::steal() },
        }
    }
}

impl MatrixIo for PortMatrix {
    fn select_row(&mut self, row: usize) {
        let bit = 1u8 << row;
        self.dp
            .PORTD
            .portd
            .modify(|r, w| unsafe { w.bits((r.bits() | ROW_MASK) & !bit) });
        tiny_delay();
    }

    fn read_columns(&mut self) -> u8 {
        let pins = self.dp.PORTD.pind.read().bits();
        // Active low: invert so a set bit means pressed.
        (!pins & COL_MASK) >> COL_SHIFT
    }

    fn release_rows(&mut self) {
        self.dp
            .PORTD
            .portd
            .modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK) });
    }
}

/// Short delay for pin settling (~5us at 8MHz).
#[inline(always)]
fn tiny_delay() {
    for _ in 0..10u8 {
        unsafe { core::arch::asm!("nop") };
    }
}
