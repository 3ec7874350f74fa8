//! Receive and transmit buffers of the bus engine.

use crate::error::{Error, Result};

/// Bytes the receive ring holds before dropping input.
pub const RX_BUFFER_SIZE: usize = 16;
/// Size of the reply buffer. Reads past the staged reply wrap around it.
pub const TX_BUFFER_SIZE: usize = 4;

/// Ring of received bytes, filled from the bus interrupt and drained by the
/// dispatcher.
///
/// Every slot is usable: when `write` catches up with `read` the `full` flag
/// is set and further bytes are dropped until a read makes room.
pub struct RxBuffer<const N: usize = RX_BUFFER_SIZE> {
    slots: [u8; N],
    write: usize,
    read: usize,
    full: bool,
}

impl<const N: usize> RxBuffer<N> {
    pub const fn new() -> Self {
        Self {
            slots: [0; N],
            write: 0,
            read: 0,
            full: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.write == self.read && !self.full
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn len(&self) -> usize {
        if self.full {
            N
        } else {
            (self.write + N - self.read) % N
        }
    }

    /// Store a received byte; a full buffer drops it.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        if self.full {
            return Err(Error::ReceiveOverflow);
        }

        self.slots[self.write] = byte;
        self.write = (self.write + 1) % N;
        if self.write == self.read {
            self.full = true;
        }
        Ok(())
    }

    /// Take the oldest received byte.
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }

        let byte = self.slots[self.read];
        self.read = (self.read + 1) % N;
        self.full = false;
        Some(byte)
    }
}

impl<const N: usize> Default for RxBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The reply handed out during a master read.
pub struct TxBuffer {
    slots: [u8; TX_BUFFER_SIZE],
    next: usize,
}

impl TxBuffer {
    pub const fn new() -> Self {
        Self {
            slots: [0; TX_BUFFER_SIZE],
            next: 0,
        }
    }

    /// Replace the reply and rewind to its first byte. Bytes past
    /// `TX_BUFFER_SIZE` are cut off, unused slots read as zero.
    pub fn stage(&mut self, reply: &[u8]) -> usize {
        let len = reply.len().min(TX_BUFFER_SIZE);
        self.slots = [0; TX_BUFFER_SIZE];
        self.slots[..len].copy_from_slice(&reply[..len]);
        self.next = 0;
        len
    }

    /// Next byte to load into the data register.
    pub fn next_byte(&mut self) -> u8 {
        let byte = self.slots[self.next];
        self.next = (self.next + 1) % TX_BUFFER_SIZE;
        byte
    }
}

impl Default for TxBuffer {
    fn default() -> Self {
        Self::new()
    }
}
