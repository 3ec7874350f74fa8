//! Keyboard event queue.
//!
//! A fixed ring of key codes with one producer (the scan tick) and one
//! consumer (the command dispatcher). The producer only moves `write`, the
//! consumer only moves `read`. One slot always stays free so that
//! `write == read` unambiguously means empty.
//!
//! When the ring has no free slot the new code is written into the slot at
//! `write` but `write` is not advanced. Unread events are never evicted; the
//! next push simply retries the same slot.
//!
//! The overflow flag is raised once per stretch of fullness: the first
//! refused push latches it, further refusals stay silent until a pop or a
//! clear makes room again.

use crate::error::{Error, Result};

/// Slots in the keyboard queue; one less than this can be unread at once.
pub const KEY_QUEUE_SIZE: usize = 32;

pub struct KeyQueue<const N: usize = KEY_QUEUE_SIZE> {
    slots: [u8; N],
    write: usize,
    read: usize,
    overflowed: bool,
    saturated: bool,
}

impl<const N: usize> KeyQueue<N> {
    pub const fn new() -> Self {
        Self {
            slots: [0; N],
            write: 0,
            read: 0,
            overflowed: false,
            saturated: false,
        }
    }

    /// Most events that can wait unread.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of unread events.
    pub fn len(&self) -> usize {
        (self.write + N - self.read) % N
    }

    pub fn is_empty(&self) -> bool {
        self.write == self.read
    }

    pub fn is_full(&self) -> bool {
        advance::<N>(self.write) == self.read
    }

    /// Append a key code.
    ///
    /// On a full queue the code is written in place and the write index
    /// stays put. Only the first refusal since the queue last had room
    /// latches the overflow flag.
    pub fn push(&mut self, code: u8) -> Result<()> {
        self.slots[self.write] = code;

        let next = advance::<N>(self.write);
        if next == self.read {
            if !self.saturated {
                self.saturated = true;
                self.overflowed = true;
            }
            return Err(Error::QueueFull);
        }

        self.write = next;
        Ok(())
    }

    /// Take the oldest unread code.
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }

        let code = self.slots[self.read];
        self.read = advance::<N>(self.read);
        self.saturated = false;
        Some(code)
    }

    /// Mark every buffered event as read.
    pub fn clear(&mut self) {
        self.read = self.write;
        self.saturated = false;
    }

    /// Return and reset the overflow flag.
    pub fn take_overflow(&mut self) -> bool {
        core::mem::replace(&mut self.overflowed, false)
    }
}

impl<const N: usize> Default for KeyQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

const fn advance<const N: usize>(index: usize) -> usize {
    if index + 1 == N {
        0
    } else {
        index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue: KeyQueue = KeyQueue::new();
        for code in [3, 1, 4, 1, 5] {
            queue.push(code).unwrap();
        }
        assert_eq!(queue.len(), 5);

        let mut out = Vec::new();
        while let Some(code) = queue.pop() {
            out.push(code);
        }
        assert_eq!(out, vec![3, 1, 4, 1, 5]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wraps_around() {
        let mut queue = KeyQueue::<4>::new();
        for round in 0..10u8 {
            queue.push(round).unwrap();
            queue.push(round + 100).unwrap();
            assert_eq!(queue.pop(), Some(round));
            assert_eq!(queue.pop(), Some(round + 100));
            assert_eq!(queue.len(), 0);
        }
    }

    #[test]
    fn test_full_queue_keeps_oldest_events() {
        let mut queue: KeyQueue = KeyQueue::new();
        for code in 1..=31 {
            queue.push(code).unwrap();
        }
        assert!(queue.is_full());
        assert_eq!(queue.len(), 31);

        assert_eq!(queue.push(32), Err(Error::QueueFull));
        assert_eq!(queue.push(33), Err(Error::QueueFull));
        assert_eq!(queue.len(), 31);
        assert!(queue.take_overflow());
        assert!(!queue.take_overflow());

        for code in 1..=31 {
            assert_eq!(queue.pop(), Some(code));
        }
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_retry_in_place_after_room_frees() {
        let mut queue = KeyQueue::<4>::new();
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.push(3).unwrap();
        assert!(queue.push(4).is_err());

        assert_eq!(queue.pop(), Some(1));
        queue.push(5).unwrap();
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), Some(5));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_overflow_latched_once_while_full() {
        let mut queue = KeyQueue::<4>::new();
        for code in 1..=3 {
            queue.push(code).unwrap();
        }
        assert!(queue.push(4).is_err());
        assert!(queue.take_overflow());
        assert!(queue.push(5).is_err());
        assert!(queue.push(6).is_err());
        assert!(!queue.take_overflow());

        // Room freed and filled again: the next refusal counts.
        assert_eq!(queue.pop(), Some(1));
        queue.push(7).unwrap();
        assert!(queue.push(8).is_err());
        assert!(queue.take_overflow());

        queue.clear();
        for code in 1..=3 {
            queue.push(code).unwrap();
        }
        assert!(queue.push(4).is_err());
        assert!(queue.take_overflow());
    }

    #[test]
    fn test_clear_discards_unread() {
        let mut queue: KeyQueue = KeyQueue::new();
        queue.push(7).unwrap();
        queue.push(8).unwrap();
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);

        queue.push(9).unwrap();
        assert_eq!(queue.pop(), Some(9));
    }

    #[test]
    fn test_len_across_wrap() {
        let mut queue = KeyQueue::<8>::new();
        for code in 0..6 {
            queue.push(code).unwrap();
        }
        for _ in 0..5 {
            queue.pop();
        }
        for code in 0..4 {
            queue.push(code).unwrap();
        }
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.capacity(), 7);
    }
}
