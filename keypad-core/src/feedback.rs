//! Status LEDs and the piezo line.
//!
//! Sound is a square wave bit-banged on one output with blocking delays.
//! The click runs inside the scan tick, the alert in the main loop.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{Error, Result};
use crate::LED_COUNT;

/// A burst of square wave on the sound line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    /// Number of high/low periods.
    pub cycles: u16,
    /// Duration of each half period.
    pub half_period_us: u32,
}

/// Key click: 10 ms at 1 kHz.
pub const CLICK: Pulse = Pulse {
    cycles: 10,
    half_period_us: 500,
};

/// Overflow alert: 140 ms at 500 Hz.
pub const ALERT: Pulse = Pulse {
    cycles: 70,
    half_period_us: 1000,
};

/// LED on-time per step of the boot greeting.
const GREETING_STEP_MS: u32 = 100;

pub struct Buzzer<P, D> {
    pin: P,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> Buzzer<P, D> {
    pub const fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Play `pulse`, blocking for its whole duration. The line ends low.
    pub fn play(&mut self, pulse: Pulse) -> Result<()> {
        for _ in 0..pulse.cycles {
            self.pin.set_high().map_err(|_| Error::Output)?;
            self.delay.delay_us(pulse.half_period_us);
            self.pin.set_low().map_err(|_| Error::Output)?;
            self.delay.delay_us(pulse.half_period_us);
        }
        Ok(())
    }

    pub fn click(&mut self) -> Result<()> {
        self.play(CLICK)
    }

    pub fn alert(&mut self) -> Result<()> {
        self.play(ALERT)
    }
}

pub struct Leds<P> {
    pins: [P; LED_COUNT],
}

impl<P: OutputPin> Leds<P> {
    pub fn new(pins: [P; LED_COUNT]) -> Self {
        Self { pins }
    }

    pub fn set(&mut self, led: u8, on: bool) -> Result<()> {
        let pin = self
            .pins
            .get_mut(led as usize)
            .ok_or(Error::InvalidLed(led))?;
        if on {
            pin.set_high().map_err(|_| Error::Output)
        } else {
            pin.set_low().map_err(|_| Error::Output)
        }
    }

    /// Light each LED in turn once, as a sign of life after reset.
    pub fn greet<D: DelayNs>(&mut self, delay: &mut D) -> Result<()> {
        for pin in self.pins.iter_mut() {
            pin.set_high().map_err(|_| Error::Output)?;
            delay.delay_ms(GREETING_STEP_MS);
            pin.set_low().map_err(|_| Error::Output)?;
        }
        Ok(())
    }
}
