//! Static mapping from matrix position to logical key code.
//!
//! Codes run from 1 to 16 and 0 is reserved for "no key". The membrane pad
//! is wired column-major, so the code at `(row, col)` is `1 + row + 4 * col`.

use crate::{COLS, ROWS};

/// Code reported when no key is pressed.
pub const NO_KEY: u8 = 0;

/// Highest valid key code.
pub const MAX_KEY: u8 = (ROWS * COLS) as u8;

/// Key code for every matrix position, indexed `[row][col]`.
pub static KEY_CODES: [[u8; COLS]; ROWS] = [
    [1, 5, 9, 13],
    [2, 6, 10, 14],
    [3, 7, 11, 15],
    [4, 8, 12, 16],
];

/// Printed legend for every key code. Index 0 is the "no key" slot.
static LEGENDS: [char; 17] = [
    ' ', //
    '1', '2', '3', 'A', //
    '4', '5', '6', 'B', //
    '7', '8', '9', 'C', //
    '*', '0', '#', 'D',
];

/// Look up the key code at a matrix position.
pub fn code_at(row: usize, col: usize) -> Option<u8> {
    KEY_CODES.get(row)?.get(col).copied()
}

/// Find the matrix position of a key code.
pub fn position(code: u8) -> Option<(usize, usize)> {
    if code == NO_KEY || code > MAX_KEY {
        return None;
    }
    let index = (code - 1) as usize;
    Some((index % ROWS, index / ROWS))
}

/// Printed legend for a key code, if the code names a key.
pub fn legend(code: u8) -> Option<char> {
    match code {
        NO_KEY => None,
        c if c <= MAX_KEY => Some(LEGENDS[c as usize]),
        _ => None,
    }
}
