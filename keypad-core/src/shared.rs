//! State shared between the interrupt handlers and the main loop.
//!
//! The dispatcher never holds on to this state: every access is one short
//! closure, which the firmware runs inside an interrupt-free section.

use crate::bus::{BusEngine, Response, Status};
use crate::debounce::{KeyEvent, ScanState};
use crate::queue::KeyQueue;
use crate::settings::Settings;

/// Access to the interrupt-shared components.
pub trait Shared {
    fn with_keys<R>(&mut self, f: impl FnOnce(&mut KeyQueue) -> R) -> R;
    fn with_bus<R>(&mut self, f: impl FnOnce(&mut BusEngine) -> R) -> R;
    fn with_scan<R>(&mut self, f: impl FnOnce(&ScanState) -> R) -> R;
    /// Make new settings visible to the scan tick.
    fn publish(&mut self, settings: Settings);
}

/// All shared components in one place, for single-threaded hosts that
/// call the interrupt bodies directly.
pub struct SharedState {
    pub keys: KeyQueue,
    pub bus: BusEngine,
    pub scan: ScanState,
    pub settings: Settings,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            keys: KeyQueue::new(),
            bus: BusEngine::new(),
            scan: ScanState::new(),
            settings: Settings::DEFAULT,
        }
    }

    /// Body of the scan timer interrupt for an already scanned code.
    pub fn tick(&mut self, code: u8) -> Option<KeyEvent> {
        self.scan.tick(code, self.settings.repeat, &mut self.keys)
    }

    /// Body of the bus interrupt.
    pub fn bus_event(&mut self, status: Status, data: u8) -> Response {
        self.bus.on_status(status, data)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl Shared for SharedState {
    fn with_keys<R>(&mut self, f: impl FnOnce(&mut KeyQueue) -> R) -> R {
        f(&mut self.keys)
    }

    fn with_bus<R>(&mut self, f: impl FnOnce(&mut BusEngine) -> R) -> R {
        f(&mut self.bus)
    }

    fn with_scan<R>(&mut self, f: impl FnOnce(&ScanState) -> R) -> R {
        f(&self.scan)
    }

    fn publish(&mut self, settings: Settings) {
        self.settings = settings;
    }
}
