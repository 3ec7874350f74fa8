//! Command codes of the bus protocol.
//!
//! | Code   | Argument | Reply | Effect                                     |
//! |--------|----------|-------|--------------------------------------------|
//! | 0      | -        | 1     | next buffered key, then clear the queue    |
//! | 1      | -        | 1     | key held right now, clears the queue       |
//! | 2      | -        | 1     | number of buffered keys                    |
//! | 10..13 | 0/1      | -     | LED 0..3 off/on                            |
//! | 20     | 0/1      | -     | click sound off/on (persisted)             |
//! | 21     | 0/1      | -     | auto-repeat off/on (persisted)             |
//!
//! Key replies are the numeric codes 1..=16 (0 for none), not the ASCII
//! legend printed on the key. Masters written for the legend-byte firmware
//! must map codes through [`crate::layout::legend`].

use crate::error::Error;
use crate::LED_COUNT;

const CMD_FETCH_KEY: u8 = 0;
const CMD_POLL_STATE: u8 = 1;
const CMD_QUEUE_DEPTH: u8 = 2;
const CMD_SET_LED: u8 = 10;
const CMD_SET_SOUND: u8 = 20;
const CMD_SET_REPEAT: u8 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    FetchKey,
    PollState,
    QueueDepth,
    SetLed(u8),
    SetSound,
    SetRepeat,
}

impl Command {
    /// The byte that selects this command on the bus.
    pub const fn code(self) -> u8 {
        match self {
            Command::FetchKey => CMD_FETCH_KEY,
            Command::PollState => CMD_POLL_STATE,
            Command::QueueDepth => CMD_QUEUE_DEPTH,
            Command::SetLed(led) => CMD_SET_LED + led,
            Command::SetSound => CMD_SET_SOUND,
            Command::SetRepeat => CMD_SET_REPEAT,
        }
    }

    /// Whether one argument byte follows the command in the same write.
    pub const fn takes_argument(self) -> bool {
        matches!(
            self,
            Command::SetLed(_) | Command::SetSound | Command::SetRepeat
        )
    }

    /// Whether the master is expected to read a reply byte.
    pub const fn replies(self) -> bool {
        !self.takes_argument()
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            CMD_FETCH_KEY => Ok(Command::FetchKey),
            CMD_POLL_STATE => Ok(Command::PollState),
            CMD_QUEUE_DEPTH => Ok(Command::QueueDepth),
            c if (CMD_SET_LED..CMD_SET_LED + LED_COUNT as u8).contains(&c) => {
                Ok(Command::SetLed(c - CMD_SET_LED))
            }
            CMD_SET_SOUND => Ok(Command::SetSound),
            CMD_SET_REPEAT => Ok(Command::SetRepeat),
            other => Err(Error::UnknownCommand(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(Command::try_from(0), Ok(Command::FetchKey));
        assert_eq!(Command::try_from(1), Ok(Command::PollState));
        assert_eq!(Command::try_from(2), Ok(Command::QueueDepth));
        assert_eq!(Command::try_from(10), Ok(Command::SetLed(0)));
        assert_eq!(Command::try_from(13), Ok(Command::SetLed(3)));
        assert_eq!(Command::try_from(20), Ok(Command::SetSound));
        assert_eq!(Command::try_from(21), Ok(Command::SetRepeat));
    }

    #[test]
    fn test_unknown_codes() {
        for code in [3, 9, 14, 19, 22, 0xFF] {
            assert_eq!(Command::try_from(code), Err(Error::UnknownCommand(code)));
        }
    }

    #[test]
    fn test_code_inverts_parse() {
        for code in 0..=u8::MAX {
            if let Ok(command) = Command::try_from(code) {
                assert_eq!(command.code(), code);
            }
        }
    }

    #[test]
    fn test_argument_and_reply_shape() {
        assert!(Command::FetchKey.replies());
        assert!(!Command::QueueDepth.takes_argument());
        assert!(Command::SetLed(2).takes_argument());
        assert!(!Command::SetRepeat.replies());
    }
}
