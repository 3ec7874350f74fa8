//! Main-loop command dispatcher.
//!
//! Each call to [`Dispatcher::poll`] handles at most one command from the
//! bus receive buffer. A command that still needs its argument byte, or a
//! reply that cannot be staged because the previous one is still being
//! read, is parked and picked up again on the next call. Nothing else is
//! read from the bus while a command is parked.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::debug;

use crate::command::Command;
use crate::error::Result;
use crate::feedback::{Buzzer, Leds};
use crate::layout::NO_KEY;
use crate::settings::{Settings, Storage};
use crate::shared::Shared;

/// What one pass of the dispatcher did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The receive buffer was empty.
    Idle,
    /// A command is parked on its argument or on a busy transmitter.
    Waiting,
    /// A byte that names no command was discarded.
    Ignored(u8),
    /// A command ran to completion (its reply, if any, is staged).
    Done(Command),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parked {
    Nothing,
    Argument(Command),
    Reply(Command, u8),
}

pub struct Dispatcher<L, B, D, S> {
    leds: Leds<L>,
    buzzer: Buzzer<B, D>,
    storage: S,
    settings: Settings,
    parked: Parked,
}

impl<L, B, D, S> Dispatcher<L, B, D, S>
where
    L: OutputPin,
    B: OutputPin,
    D: DelayNs,
    S: Storage,
{
    /// Build the dispatcher and load the persisted settings.
    pub fn new(leds: Leds<L>, buzzer: Buzzer<B, D>, mut storage: S) -> Self {
        let settings = Settings::load(&mut storage);
        Self {
            leds,
            buzzer,
            storage,
            settings,
            parked: Parked::Nothing,
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Hand the current settings to the scan tick.
    pub fn publish_settings<H: Shared>(&self, shared: &mut H) {
        shared.publish(self.settings);
    }

    /// Handle the next command, if one is complete.
    pub fn poll<H: Shared>(&mut self, shared: &mut H) -> Result<Step> {
        loop {
            match self.parked {
                Parked::Reply(command, byte) => {
                    if !shared.with_bus(|bus| bus.try_stage(&[byte])) {
                        return Ok(Step::Waiting);
                    }
                    self.parked = Parked::Nothing;
                    return Ok(Step::Done(command));
                }
                Parked::Argument(command) => {
                    let Some(argument) = shared.with_bus(|bus| bus.fetch()) else {
                        return Ok(Step::Waiting);
                    };
                    self.parked = Parked::Nothing;
                    self.apply(command, argument, shared)?;
                    return Ok(Step::Done(command));
                }
                Parked::Nothing => {
                    let Some(code) = shared.with_bus(|bus| bus.fetch()) else {
                        return Ok(Step::Idle);
                    };
                    let command = match Command::try_from(code) {
                        Ok(command) => command,
                        Err(err) => {
                            debug!("ignoring byte: {}", err);
                            return Ok(Step::Ignored(code));
                        }
                    };
                    self.parked = if command.replies() {
                        Parked::Reply(command, reply_for(command, shared))
                    } else {
                        Parked::Argument(command)
                    };
                }
            }
        }
    }

    /// Sound the alert if the key queue or the receive buffer overflowed
    /// since the last check. Returns whether the alert played.
    pub fn check_overflow<H: Shared>(&mut self, shared: &mut H) -> Result<bool> {
        let keys = shared.with_keys(|keys| keys.take_overflow());
        let bus = shared.with_bus(|bus| bus.take_overflow());

        if !(keys || bus) || !self.settings.sound {
            return Ok(false);
        }
        self.buzzer.alert()?;
        Ok(true)
    }

    fn apply<H: Shared>(&mut self, command: Command, argument: u8, shared: &mut H) -> Result<()> {
        let on = argument != 0;
        match command {
            Command::SetLed(led) => self.leds.set(led, on)?,
            Command::SetSound => {
                self.settings.set_sound(on, &mut self.storage);
                shared.publish(self.settings);
            }
            Command::SetRepeat => {
                self.settings.set_repeat(on, &mut self.storage);
                shared.publish(self.settings);
            }
            Command::FetchKey | Command::PollState | Command::QueueDepth => {}
        }
        Ok(())
    }
}

/// Compute the reply byte of a query command.
///
/// Fetch and poll both drop every other buffered key: masters rely on a
/// fetch never returning a stale keystroke.
fn reply_for<H: Shared>(command: Command, shared: &mut H) -> u8 {
    match command {
        Command::FetchKey => shared.with_keys(|keys| {
            let code = keys.pop().unwrap_or(NO_KEY);
            keys.clear();
            code
        }),
        Command::PollState => {
            let code = shared.with_scan(|scan| scan.current());
            shared.with_keys(|keys| keys.clear());
            code
        }
        Command::QueueDepth => shared.with_keys(|keys| keys.len() as u8),
        Command::SetLed(_) | Command::SetSound | Command::SetRepeat => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::master;
    use crate::settings::MemoryStorage;
    use crate::shared::SharedState;
    use core::convert::Infallible;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Line(Rc<RefCell<Vec<bool>>>);

    impl embedded_hal::digital::ErrorType for Line {
        type Error = Infallible;
    }

    impl OutputPin for Line {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            self.0.borrow_mut().push(false);
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            self.0.borrow_mut().push(true);
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    type TestDispatcher = Dispatcher<Line, Line, NoDelay, MemoryStorage>;

    fn setup() -> (TestDispatcher, [Line; 4], Line) {
        let leds: [Line; 4] = Default::default();
        let sound = Line::default();
        let dispatcher = Dispatcher::new(
            Leds::new(leds.clone()),
            Buzzer::new(sound.clone(), NoDelay),
            MemoryStorage::erased(),
        );
        (dispatcher, leds, sound)
    }

    fn read_one(shared: &mut SharedState) -> u8 {
        let mut out = [0u8; 1];
        master::read(&mut shared.bus, &mut out);
        out[0]
    }

    #[test]
    fn test_idle_when_nothing_received() {
        let (mut dispatcher, _, _) = setup();
        let mut shared = SharedState::new();
        assert_eq!(dispatcher.poll(&mut shared), Ok(Step::Idle));
    }

    #[test]
    fn test_unknown_command_ignored_without_reply() {
        let (mut dispatcher, _, _) = setup();
        let mut shared = SharedState::new();
        master::write(&mut shared.bus, &[99]);
        assert_eq!(dispatcher.poll(&mut shared), Ok(Step::Ignored(99)));
        assert!(!shared.bus.is_busy());
    }

    #[test]
    fn test_argument_parks_until_received() {
        let (mut dispatcher, leds, _) = setup();
        let mut shared = SharedState::new();

        shared.bus_event(crate::Status::WriteAddressed, 0);
        shared.bus_event(crate::Status::DataReceived, 11);
        assert_eq!(dispatcher.poll(&mut shared), Ok(Step::Waiting));
        assert_eq!(dispatcher.poll(&mut shared), Ok(Step::Waiting));
        assert!(leds[1].0.borrow().is_empty());

        shared.bus_event(crate::Status::DataReceived, 1);
        shared.bus_event(crate::Status::StopOrRestart, 0);
        assert_eq!(dispatcher.poll(&mut shared), Ok(Step::Done(Command::SetLed(1))));
        assert_eq!(*leds[1].0.borrow(), vec![true]);
    }

    #[test]
    fn test_reply_parks_while_previous_unread() {
        let (mut dispatcher, _, _) = setup();
        let mut shared = SharedState::new();
        shared.keys.push(4).unwrap();

        master::write(&mut shared.bus, &[2]);
        // An earlier reply is still staged and unread.
        assert!(shared.bus.try_stage(&[7]));
        assert_eq!(dispatcher.poll(&mut shared), Ok(Step::Waiting));
        assert_eq!(dispatcher.poll(&mut shared), Ok(Step::Waiting));

        assert_eq!(read_one(&mut shared), 7);
        assert_eq!(dispatcher.poll(&mut shared), Ok(Step::Done(Command::QueueDepth)));
        assert_eq!(read_one(&mut shared), 1);
    }

    #[test]
    fn test_poll_state_clears_queue() {
        let (mut dispatcher, _, _) = setup();
        let mut shared = SharedState::new();
        for _ in 0..3 {
            shared.tick(6);
        }
        assert_eq!(shared.keys.len(), 1);

        master::write(&mut shared.bus, &[1]);
        dispatcher.poll(&mut shared).unwrap();
        assert_eq!(read_one(&mut shared), 6);
        assert!(shared.keys.is_empty());
    }

    #[test]
    fn test_fetch_clears_remaining_keys() {
        let (mut dispatcher, _, _) = setup();
        let mut shared = SharedState::new();
        for code in [3, 4, 5] {
            shared.keys.push(code).unwrap();
        }

        master::write(&mut shared.bus, &[0]);
        dispatcher.poll(&mut shared).unwrap();
        assert_eq!(read_one(&mut shared), 3);
        assert!(shared.keys.is_empty());
    }

    #[test]
    fn test_settings_published_to_tick() {
        let (mut dispatcher, _, _) = setup();
        let mut shared = SharedState::new();
        dispatcher.publish_settings(&mut shared);
        assert!(!shared.settings.repeat);

        master::write(&mut shared.bus, &[21, 1]);
        assert_eq!(dispatcher.poll(&mut shared), Ok(Step::Done(Command::SetRepeat)));
        assert!(shared.settings.repeat);
        assert!(dispatcher.settings().repeat);
    }

    #[test]
    fn test_overflow_alert_respects_sound_setting() {
        let (mut dispatcher, _, sound) = setup();
        let mut shared = SharedState::new();

        assert_eq!(dispatcher.check_overflow(&mut shared), Ok(false));

        master::write(&mut shared.bus, &[20, 0]);
        dispatcher.poll(&mut shared).unwrap();
        for code in 1..=40 {
            let _ = shared.keys.push(code);
        }
        assert_eq!(dispatcher.check_overflow(&mut shared), Ok(false));
        assert!(sound.0.borrow().is_empty());

        master::write(&mut shared.bus, &[20, 1]);
        dispatcher.poll(&mut shared).unwrap();
        let _ = shared.keys.push(41);
        assert_eq!(dispatcher.check_overflow(&mut shared), Ok(true));
        assert_eq!(sound.0.borrow().iter().filter(|high| **high).count(), 70);
    }
}
