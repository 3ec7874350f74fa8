//! Shared state machines for the I2C keypad.
//!
//! This crate is `no_std`-compatible so the AVR firmware and the native
//! simulator run exactly the same scan, queue, bus and dispatch logic.
//! Nothing in here touches registers: hardware is reached through the
//! [`matrix::MatrixIo`], [`settings::Storage`] and `embedded-hal` traits.

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod command;
pub mod debounce;
pub mod dispatch;
pub mod error;
pub mod feedback;
pub mod layout;
pub mod matrix;
pub mod queue;
pub mod settings;
pub mod shared;

pub use bus::{BusEngine, Control, Response, Status};
pub use command::Command;
pub use debounce::{KeyEvent, ScanState};
pub use dispatch::{Dispatcher, Step};
pub use error::{Error, Result};
pub use feedback::{Buzzer, Leds, Pulse};
pub use queue::KeyQueue;
pub use settings::{Settings, Storage};
pub use shared::{Shared, SharedState};

/// Number of rows in the matrix.
pub const ROWS: usize = 4;
/// Number of columns in the matrix.
pub const COLS: usize = 4;
/// Number of status LEDs.
pub const LED_COUNT: usize = 4;

/// 7-bit slave address the device answers to.
pub const BUS_ADDRESS: u8 = 0x5A;

/// Scan timer rate. The debounce and repeat thresholds count these ticks.
pub const TICK_HZ: u16 = 75;
