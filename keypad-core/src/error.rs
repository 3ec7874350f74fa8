//! Error type for the keypad state machines.
//!
//! Variants carry only fixed-size data so errors can be produced inside
//! interrupt handlers without allocation.

use core::fmt;

/// Everything that can go wrong in the keypad core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The key queue had no free slot; the newest event was discarded.
    QueueFull,
    /// The bus receive buffer was full; the incoming byte was dropped.
    ReceiveOverflow,
    /// A command byte that names no known command.
    UnknownCommand(u8),
    /// LED index outside the fitted LEDs.
    InvalidLed(u8),
    /// A discrete output line refused to switch.
    Output,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::QueueFull => f.write_str("key queue full"),
            Error::ReceiveOverflow => f.write_str("bus receive buffer overflow"),
            Error::UnknownCommand(code) => write!(f, "unknown command {}", code),
            Error::InvalidLed(led) => write!(f, "no LED with index {}", led),
            Error::Output => f.write_str("output line error"),
        }
    }
}

impl core::error::Error for Error {}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
