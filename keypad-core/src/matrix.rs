//! Key matrix scanning.
//!
//! Rows are driven low one at a time while the columns are read back
//! through pull-ups. The first row showing any asserted column ends the
//! scan: a single column maps to that key, several columns in the same row
//! report no key at all (the pad has no diodes, so this is ghosting).

use crate::layout::{KEY_CODES, NO_KEY};
use crate::{COLS, ROWS};

/// Bits of [`MatrixIo::read_columns`] that correspond to real columns.
pub const COLUMN_MASK: u8 = (1 << COLS) - 1;

/// Raw access to the matrix lines.
pub trait MatrixIo {
    /// Drive `row` low and every other row high, then let the lines settle.
    fn select_row(&mut self, row: usize);
    /// Asserted columns as a bitmask, bit N set = column N pulled low.
    fn read_columns(&mut self) -> u8;
    /// Return every row to the inactive (high) level.
    fn release_rows(&mut self);
}

/// Decode the column bits read while `row` was selected.
pub fn decode_row(row: usize, columns: u8) -> u8 {
    let columns = columns & COLUMN_MASK;
    if columns.count_ones() != 1 || row >= ROWS {
        return NO_KEY;
    }
    KEY_CODES[row][columns.trailing_zeros() as usize]
}

/// Scan the whole matrix once and return the pressed key code, or
/// [`NO_KEY`].
pub fn scan<M: MatrixIo>(io: &mut M) -> u8 {
    for row in 0..ROWS {
        io.select_row(row);
        let columns = io.read_columns() & COLUMN_MASK;
        io.release_rows();

        if columns != 0 {
            return decode_row(row, columns);
        }
    }

    NO_KEY
}
