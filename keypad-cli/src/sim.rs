//! A keypad simulated on the host.
//!
//! Runs the same scan, bus and dispatch code as the firmware. The matrix is
//! a single virtual finger, the outputs are probes, and the EEPROM is a RAM
//! image that outlives [`Simulator::reboot`]. Interrupts are modelled by
//! calling their bodies directly: after every scan tick and every bus
//! transaction the main loop runs until it has nothing left to do.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use anyhow::{bail, Result};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use keypad_core::bus::master;
use keypad_core::layout::{self, NO_KEY};
use keypad_core::matrix::{self, MatrixIo};
use keypad_core::settings::MemoryStorage;
use keypad_core::{Buzzer, Dispatcher, Leds, Settings, SharedState, Step, Storage, LED_COUNT};
use log::info;

use crate::client::Transport;

/// An output line that remembers its level and counts rising edges.
#[derive(Clone, Default)]
pub struct Probe {
    level: Rc<Cell<bool>>,
    rises: Rc<Cell<usize>>,
}

impl Probe {
    pub fn is_high(&self) -> bool {
        self.level.get()
    }

    pub fn rises(&self) -> usize {
        self.rises.get()
    }
}

impl ErrorType for Probe {
    type Error = Infallible;
}

impl OutputPin for Probe {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        if !self.level.get() {
            self.rises.set(self.rises.get() + 1);
        }
        self.level.set(true);
        Ok(())
    }
}

/// Simulated time does not pass.
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// EEPROM image shared across reboots.
#[derive(Clone, Default)]
pub struct Eeprom(Rc<RefCell<MemoryStorage>>);

impl Storage for Eeprom {
    fn load(&mut self, slot: u8) -> u8 {
        self.0.borrow_mut().load(slot)
    }

    fn store(&mut self, slot: u8, value: u8) {
        self.0.borrow_mut().store(slot, value)
    }
}

/// At most one key held at a time.
#[derive(Default)]
struct Finger {
    held: Option<(usize, usize)>,
    selected: Option<usize>,
}

impl MatrixIo for Finger {
    fn select_row(&mut self, row: usize) {
        self.selected = Some(row);
    }

    fn read_columns(&mut self) -> u8 {
        match (self.held, self.selected) {
            (Some((row, col)), Some(selected)) if row == selected => 1 << col,
            _ => 0,
        }
    }

    fn release_rows(&mut self) {
        self.selected = None;
    }
}

type SimDispatcher = Dispatcher<Probe, Probe, NoDelay, Eeprom>;

pub struct Simulator {
    shared: SharedState,
    dispatcher: SimDispatcher,
    click: Buzzer<Probe, NoDelay>,
    finger: Finger,
    leds: [Probe; LED_COUNT],
    sound: Probe,
    eeprom: Eeprom,
    ticks: u64,
    clicks: u32,
    alerts: u32,
}

impl Simulator {
    /// Power up with an erased EEPROM.
    pub fn new() -> Result<Self> {
        Self::boot(Eeprom::default())
    }

    fn boot(eeprom: Eeprom) -> Result<Self> {
        let leds: [Probe; LED_COUNT] = Default::default();
        let sound = Probe::default();

        let mut greeter = Leds::new(leds.clone());
        greeter.greet(&mut NoDelay)?;

        let dispatcher = Dispatcher::new(
            greeter,
            Buzzer::new(sound.clone(), NoDelay),
            eeprom.clone(),
        );
        let mut shared = SharedState::new();
        dispatcher.publish_settings(&mut shared);

        Ok(Self {
            shared,
            dispatcher,
            click: Buzzer::new(sound.clone(), NoDelay),
            finger: Finger::default(),
            leds,
            sound,
            eeprom,
            ticks: 0,
            clicks: 0,
            alerts: 0,
        })
    }

    /// Reset the device. RAM state is lost, the EEPROM and any held key
    /// are not.
    pub fn reboot(&mut self) -> Result<()> {
        let held = self.finger.held;
        *self = Self::boot(self.eeprom.clone())?;
        self.finger.held = held;
        info!("rebooted, settings {:?}", self.settings());
        Ok(())
    }

    /// Put the finger on key `code` and keep it there for `ticks` scans.
    pub fn press(&mut self, code: u8, ticks: u32) -> Result<()> {
        let Some(position) = layout::position(code) else {
            bail!("no key with code {}", code);
        };
        self.finger.held = Some(position);
        self.run(ticks)
    }

    /// Lift the finger and run `ticks` scans.
    pub fn release(&mut self, ticks: u32) -> Result<()> {
        self.finger.held = None;
        self.run(ticks)
    }

    pub fn run(&mut self, ticks: u32) -> Result<()> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// One scan timer interrupt, then the main loop.
    pub fn tick(&mut self) -> Result<()> {
        let code = matrix::scan(&mut self.finger);
        let event = self.shared.tick(code);
        self.ticks += 1;

        if event.is_some() && self.shared.settings.sound {
            self.click.click()?;
            self.clicks += 1;
        }
        self.settle()
    }

    fn settle(&mut self) -> Result<()> {
        loop {
            let step = self.dispatcher.poll(&mut self.shared)?;
            if self.dispatcher.check_overflow(&mut self.shared)? {
                self.alerts += 1;
            }
            if matches!(step, Step::Idle | Step::Waiting) {
                return Ok(());
            }
        }
    }

    pub fn settings(&self) -> Settings {
        self.dispatcher.settings()
    }

    pub fn led(&self, led: usize) -> bool {
        self.leds.get(led).map(Probe::is_high).unwrap_or(false)
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn alerts(&self) -> u32 {
        self.alerts
    }

    /// Rising edges seen on the sound line since boot.
    pub fn sound_edges(&self) -> usize {
        self.sound.rises()
    }

    pub fn queued(&self) -> usize {
        self.shared.keys.len()
    }

    /// The key the scanner currently reports as held.
    pub fn held(&self) -> u8 {
        self.shared.scan.current()
    }

    /// One-line summary of the device state.
    pub fn status(&self) -> String {
        let leds: String = (0..LED_COUNT)
            .map(|led| if self.led(led) { '*' } else { '.' })
            .collect();
        let held = match self.held() {
            NO_KEY => "-".to_string(),
            code => format!("{} '{}'", code, layout::legend(code).unwrap_or('?')),
        };
        let settings = self.settings();
        format!(
            "tick {} | held {} | queued {}/{} | leds {} | sound {} | repeat {} | clicks {} | alerts {} | pulses {}",
            self.ticks,
            held,
            self.queued(),
            self.shared.keys.capacity(),
            leds,
            on_off(settings.sound),
            on_off(settings.repeat),
            self.clicks(),
            self.alerts(),
            self.sound_edges()
        )
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

impl Transport for Simulator {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        master::write(&mut self.shared.bus, bytes);
        self.settle()
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        master::read(&mut self.shared.bus, &mut out);
        self.settle()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use keypad_core::feedback::{ALERT, CLICK};

    #[test]
    fn test_boot_greets_and_leaves_leds_off() {
        let sim = Simulator::new().unwrap();
        for led in 0..LED_COUNT {
            assert!(!sim.led(led));
            assert_eq!(sim.leds[led].rises(), 1);
        }
        assert_eq!(sim.settings(), Settings::DEFAULT);
    }

    #[test]
    fn test_press_is_debounced_and_clicked() {
        let mut sim = Simulator::new().unwrap();
        sim.press(5, 2).unwrap();
        assert_eq!(sim.queued(), 0);
        sim.press(5, 2).unwrap();
        assert_eq!(sim.queued(), 1);
        assert_eq!(sim.held(), 5);
        assert_eq!(sim.clicks(), 1);
        assert_eq!(sim.sound_edges(), CLICK.cycles as usize);

        sim.release(1).unwrap();
        assert_eq!(sim.held(), 0);
        assert_eq!(sim.queued(), 1);
    }

    #[test]
    fn test_client_over_simulator() {
        let mut client = Client::new(Simulator::new().unwrap());
        client.transport_mut().press(11, 3).unwrap();
        client.transport_mut().release(1).unwrap();
        client.transport_mut().press(16, 3).unwrap();

        assert_eq!(client.check().unwrap(), 2);
        assert_eq!(client.read().unwrap(), 11);
        assert_eq!(client.check().unwrap(), 0);
        assert_eq!(client.read_direct().unwrap(), 16);

        client.set_led(2, true).unwrap();
        assert!(client.transport().led(2));
    }

    #[test]
    fn test_overflow_alerts_once_until_room_frees() {
        let mut sim = Simulator::new().unwrap();
        for i in 0..33u8 {
            sim.press(i % 16 + 1, 3).unwrap();
            sim.release(1).unwrap();
        }
        // Events 32 and 33 find the queue full; only the first alerts.
        assert_eq!(sim.queued(), 31);
        assert_eq!(sim.clicks(), 33);
        assert_eq!(sim.alerts(), 1);
        assert_eq!(
            sim.sound_edges(),
            33 * CLICK.cycles as usize + ALERT.cycles as usize
        );

        // A fetch empties the queue, so the next overflow alerts again.
        let mut client = Client::new(sim);
        assert_eq!(client.read().unwrap(), 1);
        let sim = client.transport_mut();
        for i in 0..32u8 {
            sim.press(i % 16 + 1, 3).unwrap();
            sim.release(1).unwrap();
        }
        assert_eq!(sim.alerts(), 2);
    }

    #[test]
    fn test_sound_off_is_silent_and_survives_reboot() {
        let mut client = Client::new(Simulator::new().unwrap());
        client.set_sound(false).unwrap();
        client.transport_mut().reboot().unwrap();

        let sim = client.transport_mut();
        assert!(!sim.settings().sound);
        sim.press(1, 3).unwrap();
        assert_eq!(sim.clicks(), 0);
        assert_eq!(sim.sound_edges(), 0);
    }

    #[test]
    fn test_reboot_keeps_held_key_and_drops_queue() {
        let mut sim = Simulator::new().unwrap();
        sim.press(7, 3).unwrap();
        sim.reboot().unwrap();
        assert_eq!(sim.queued(), 0);
        sim.run(3).unwrap();
        assert_eq!(sim.held(), 7);
    }

    #[test]
    fn test_unknown_key_code_rejected() {
        let mut sim = Simulator::new().unwrap();
        assert!(sim.press(0, 1).is_err());
        assert!(sim.press(17, 1).is_err());
    }
}
