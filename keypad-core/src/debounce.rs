//! Debounce and auto-repeat.
//!
//! Runs once per timer tick on the code returned by the matrix scan. A key
//! must read the same for CONFIRM_TICKS consecutive scans before an event is
//! emitted. While it stays down and repeat is enabled, further events follow
//! after REPEAT_DELAY_TICKS and then every REPEAT_INTERVAL_TICKS.

use log::warn;

use crate::layout::NO_KEY;
use crate::queue::KeyQueue;

/// Consecutive identical scans needed to register a press.
/// At 75 Hz this gives 40 ms.
pub const CONFIRM_TICKS: u8 = 3;
/// Streak length at which auto-repeat kicks in (1 s).
pub const REPEAT_DELAY_TICKS: u8 = 75;
/// Ticks between repeated events (0.2 s, 5 events per second).
pub const REPEAT_INTERVAL_TICKS: u8 = 15;

/// An event produced by the debounce state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// First confirmation of a press.
    Pressed(u8),
    /// Auto-repeat while the key is held.
    Repeated(u8),
}

impl KeyEvent {
    pub fn code(self) -> u8 {
        match self {
            KeyEvent::Pressed(code) | KeyEvent::Repeated(code) => code,
        }
    }
}

/// Per-tick state of the scan timer.
pub struct ScanState {
    /// Code seen on the previous non-empty scan.
    last_code: u8,
    /// Consecutive scans on which `last_code` has been seen.
    streak: u8,
}

impl ScanState {
    pub const fn new() -> Self {
        Self {
            last_code: NO_KEY,
            streak: 0,
        }
    }

    /// Feed one scan result. Returns the event to emit, if any.
    pub fn update(&mut self, code: u8, repeat: bool) -> Option<KeyEvent> {
        if code == NO_KEY {
            self.streak = 0;
            return None;
        }

        if code != self.last_code {
            self.last_code = code;
            self.streak = 1;
        } else {
            self.streak = self.streak.saturating_add(1);
        }

        if self.streak == CONFIRM_TICKS {
            return Some(KeyEvent::Pressed(code));
        }

        if repeat && self.streak >= REPEAT_DELAY_TICKS {
            self.streak = REPEAT_DELAY_TICKS - REPEAT_INTERVAL_TICKS;
            return Some(KeyEvent::Repeated(code));
        }

        None
    }

    /// Feed one scan result and push any resulting event into `queue`.
    ///
    /// The event is returned even if the queue refused it, so the caller can
    /// still give the click.
    pub fn tick<const N: usize>(
        &mut self,
        code: u8,
        repeat: bool,
        queue: &mut KeyQueue<N>,
    ) -> Option<KeyEvent> {
        let event = self.update(code, repeat)?;

        if queue.push(event.code()).is_err() {
            warn!("key queue full, dropped key {}", event.code());
        }

        Some(event)
    }

    /// The key currently held down and confirmed, or `NO_KEY`.
    pub fn current(&self) -> u8 {
        if self.streak >= CONFIRM_TICKS {
            self.last_code
        } else {
            NO_KEY
        }
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}
