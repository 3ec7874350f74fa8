//! Two-wire (TWI/I2C) slave protocol.
//!
//! The bus controller raises an interrupt for every protocol event and
//! reports what happened through a status code. [`BusEngine::on_status`] is
//! the whole interrupt body: it moves bytes between the data register and
//! the receive/transmit buffers and tells the caller how to re-arm the
//! controller. The main loop talks to the engine only through the buffer
//! methods.

mod buffer;
mod engine;
pub mod master;
mod status;

pub use buffer::{RxBuffer, TxBuffer, RX_BUFFER_SIZE, TX_BUFFER_SIZE};
pub use engine::{BusEngine, Control, Response};
pub use status::Status;
