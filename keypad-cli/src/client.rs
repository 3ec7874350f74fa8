//! Bus master side of the keypad protocol.

use anyhow::{bail, Context, Result};
use keypad_core::{Command, LED_COUNT};

/// Raw bus transactions addressed to the keypad.
pub trait Transport {
    /// One write transaction carrying `bytes`.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
    /// One read transaction of `len` bytes.
    fn read(&mut self, len: usize) -> Result<Vec<u8>>;
}

pub struct Client<T> {
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Number of buffered key events.
    pub fn check(&mut self) -> Result<u8> {
        self.query(Command::QueueDepth)
    }

    /// Oldest buffered key, or 0. Drops the rest of the buffer.
    pub fn read(&mut self) -> Result<u8> {
        self.query(Command::FetchKey)
    }

    /// Key held right now, or 0. Drops the buffer.
    pub fn read_direct(&mut self) -> Result<u8> {
        self.query(Command::PollState)
    }

    pub fn set_led(&mut self, led: u8, on: bool) -> Result<()> {
        if led as usize >= LED_COUNT {
            bail!("no LED {} (the keypad has {})", led, LED_COUNT);
        }
        self.send(Command::SetLed(led), on)
    }

    pub fn set_sound(&mut self, on: bool) -> Result<()> {
        self.send(Command::SetSound, on)
    }

    pub fn set_repeat(&mut self, on: bool) -> Result<()> {
        self.send(Command::SetRepeat, on)
    }

    fn query(&mut self, command: Command) -> Result<u8> {
        self.transport.write(&[command.code()])?;
        let reply = self.transport.read(1)?;
        reply
            .first()
            .copied()
            .with_context(|| format!("no reply to {:?}", command))
    }

    fn send(&mut self, command: Command, on: bool) -> Result<()> {
        self.transport.write(&[command.code(), on as u8])
    }
}
