use log::warn;

use super::buffer::{RxBuffer, TxBuffer, RX_BUFFER_SIZE};
use super::status::Status;

/// How to hand the controller back once the interrupt is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Clear the interrupt flag and acknowledge the next address match or
    /// data byte.
    Ack,
    /// Send a STOP to release SDA and SCL, then wait for the next address
    /// match.
    Release,
}

/// Outcome of one bus interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// Byte to load into the data register before re-arming.
    pub transmit: Option<u8>,
    pub control: Control,
}

impl Response {
    const fn ack() -> Self {
        Self {
            transmit: None,
            control: Control::Ack,
        }
    }

    const fn send(byte: u8) -> Self {
        Self {
            transmit: Some(byte),
            control: Control::Ack,
        }
    }

    const fn release() -> Self {
        Self {
            transmit: None,
            control: Control::Release,
        }
    }
}

/// Slave-side protocol state.
///
/// `busy` is set from the moment a transaction addresses the device or a
/// reply is staged, and cleared when the master ends a read, a transaction
/// stops, or the bus has to be recovered.
pub struct BusEngine<const N: usize = RX_BUFFER_SIZE> {
    rx: RxBuffer<N>,
    tx: TxBuffer,
    busy: bool,
    overflowed: bool,
}

impl<const N: usize> BusEngine<N> {
    pub const fn new() -> Self {
        Self {
            rx: RxBuffer::new(),
            tx: TxBuffer::new(),
            busy: false,
            overflowed: false,
        }
    }

    /// Advance the protocol for one controller interrupt.
    ///
    /// `data` is the content of the data register, only meaningful for
    /// the data-received states.
    pub fn on_status(&mut self, status: Status, data: u8) -> Response {
        match status {
            Status::ReadAddressed | Status::ByteSentAck => {
                self.busy = true;
                Response::send(self.tx.next_byte())
            }
            Status::ByteSentNack => {
                self.busy = false;
                Response::ack()
            }
            Status::WriteAddressed | Status::GeneralCall => {
                self.busy = true;
                Response::ack()
            }
            Status::DataReceived | Status::GeneralCallData => {
                if self.rx.push(data).is_err() {
                    warn!("bus receive buffer full, dropped {:#04x}", data);
                    self.overflowed = true;
                }
                self.busy = true;
                Response::ack()
            }
            Status::StopOrRestart => {
                self.busy = false;
                Response::ack()
            }
            Status::DataReceivedNack
            | Status::GeneralCallDataNack
            | Status::LastByteSentAck
            | Status::BusError => {
                self.busy = false;
                Response::release()
            }
            Status::Unknown(_) => {
                self.busy = false;
                Response::ack()
            }
        }
    }

    /// Whether a transaction or staged reply is in progress.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Take the next received byte.
    pub fn fetch(&mut self) -> Option<u8> {
        self.rx.pop()
    }

    /// Stage a reply for the next master read. Refused while busy.
    pub fn try_stage(&mut self, reply: &[u8]) -> bool {
        if self.busy {
            return false;
        }
        self.tx.stage(reply);
        self.busy = true;
        true
    }

    /// Return and reset the receive overflow flag.
    pub fn take_overflow(&mut self) -> bool {
        core::mem::replace(&mut self.overflowed, false)
    }
}

impl<const N: usize> Default for BusEngine<N> {
    fn default() -> Self {
        Self::new()
    }
}
