//! Statics shared between the interrupt handlers and the main loop.

use core::cell::{Cell, RefCell};

use avr_device::interrupt::{self, Mutex};
use keypad_core::{BusEngine, KeyQueue, ScanState, Settings, Shared};

pub static KEYS: Mutex<RefCell<KeyQueue>> = Mutex::new(RefCell::new(KeyQueue::new()));
pub static BUS: Mutex<RefCell<BusEngine>> = Mutex::new(RefCell::new(BusEngine::new()));
pub static SCAN: Mutex<RefCell<ScanState>> = Mutex::new(RefCell::new(ScanState::new()));
pub static SETTINGS: Mutex<Cell<Settings>> = Mutex::new(Cell::new(Settings::DEFAULT));

/// Main-loop handle on the statics. Every access is a critical section.
pub struct Globals;

impl Shared for Globals {
    fn with_keys<R>(&mut self, f: impl FnOnce(&mut KeyQueue) -> R) -> R {
        interrupt::free(|cs| f(&mut KEYS.borrow(cs).borrow_mut()))
    }

    fn with_bus<R>(&mut self, f: impl FnOnce(&mut BusEngine) -> R) -> R {
        interrupt::free(|cs| f(&mut BUS.borrow(cs).borrow_mut()))
    }

    fn with_scan<R>(&mut self, f: impl FnOnce(&ScanState) -> R) -> R {
        interrupt::free(|cs| f(&SCAN.borrow(cs).borrow()))
    }

    fn publish(&mut self, settings: Settings) {
        interrupt::free(|cs| SETTINGS.borrow(cs).set(settings));
    }
}
