//! The slave-side view of master transactions.
//!
//! Replays the status sequence the controller reports for a complete write
//! or read, so the engine can be driven without hardware.

use super::engine::BusEngine;
use super::status::Status;

/// A master write of `bytes`: address, one data phase per byte, STOP.
pub fn write<const N: usize>(engine: &mut BusEngine<N>, bytes: &[u8]) {
    engine.on_status(Status::WriteAddressed, 0);
    for &byte in bytes {
        engine.on_status(Status::DataReceived, byte);
    }
    engine.on_status(Status::StopOrRestart, 0);
}

/// A master read filling `out`: address, ACK after every byte but the last,
/// NACK after the last.
pub fn read<const N: usize>(engine: &mut BusEngine<N>, out: &mut [u8]) {
    if out.is_empty() {
        return;
    }

    for (i, slot) in out.iter_mut().enumerate() {
        let status = if i == 0 {
            Status::ReadAddressed
        } else {
            Status::ByteSentAck
        };
        *slot = engine.on_status(status, 0).transmit.unwrap_or(0);
    }
    engine.on_status(Status::ByteSentNack, 0);
}
