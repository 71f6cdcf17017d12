//! Key-matrix scanning.
//!
//! Columns are select lines, rows are sense lines. Both idle high through
//! pull-ups; selecting a column drives it low, and any row that then reads
//! low has a closed switch at that crossing:
//!
//! ```text
//!            col 0     col 1     ...   col 9
//!   row 0 ───┼─[sw]────┼─[sw]────  ...──┼─[sw]──  (input, pull-up)
//!   row 1 ───┼─[sw]────┼─[sw]────  ...──┼─[sw]──
//!    ...
//!   row 5 ───┼─[sw]────┼─[sw]────  ...──┼─[sw]──
//! ```
//!
//! Each switch becomes bit `row * COLS + col` of a [`KeyMask`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::{KEY_COUNT, SETTLE_MICROS};

/// One bit per key position. A fresh value is produced every scan.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyMask(u64);

impl KeyMask {
    pub const EMPTY: KeyMask = KeyMask(0);

    /// Mask with only `key` set. Positions past 63 yield an empty mask.
    pub const fn bit(key: usize) -> Self {
        if key < 64 {
            Self(1 << key)
        } else {
            Self(0)
        }
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, key: usize) -> bool {
        key < 64 && self.0 & (1 << key) != 0
    }

    pub fn set(&mut self, key: usize) {
        self.0 |= Self::bit(key).0;
    }

    /// Bits set here but not in `prev`.
    pub const fn rising(self, prev: KeyMask) -> KeyMask {
        KeyMask(self.0 & !prev.0)
    }

    /// Bits set in `prev` but not here.
    pub const fn falling(self, prev: KeyMask) -> KeyMask {
        KeyMask(prev.0 & !self.0)
    }

    /// Set key positions in ascending (scan) order.
    pub fn keys(self) -> Keys {
        Keys(self.0)
    }
}

impl core::ops::BitOr for KeyMask {
    type Output = KeyMask;

    fn bitor(self, rhs: Self) -> Self {
        KeyMask(self.0 | rhs.0)
    }
}

/// Iterator over the set positions of a [`KeyMask`].
pub struct Keys(u64);

impl Iterator for Keys {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let key = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(key)
    }
}

/// Anything that can produce the current key state on demand.
pub trait KeyScanner {
    fn scan(&mut self) -> KeyMask;
}

/// Timing contract of one column select.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanTiming {
    /// Delay between driving a column and sampling the rows (µs).
    pub settle_us: u32,
}

impl Default for ScanTiming {
    fn default() -> Self {
        Self {
            settle_us: SETTLE_MICROS,
        }
    }
}

/// Row/column matrix scanner over `embedded-hal` pins.
pub struct MatrixScanner<I, O, D, const ROWS: usize, const COLS: usize> {
    rows: [I; ROWS],
    cols: [O; COLS],
    delay: D,
    timing: ScanTiming,
}

impl<I, O, D, const ROWS: usize, const COLS: usize> MatrixScanner<I, O, D, ROWS, COLS>
where
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    /// Take ownership of the pins and park every column in its idle
    /// (deselected, high) state.
    pub fn new(rows: [I; ROWS], mut cols: [O; COLS], delay: D, timing: ScanTiming) -> Self {
        const { assert!(ROWS * COLS <= 64, "matrix does not fit a KeyMask") };
        for col in cols.iter_mut() {
            if col.set_high().is_err() {
                warn!("matrix: column failed to idle");
            }
        }
        Self {
            rows,
            cols,
            delay,
            timing,
        }
    }

    /// Scan the whole matrix once.
    pub fn scan(&mut self) -> KeyMask {
        let mut mask = KeyMask::EMPTY;
        for (c, col) in self.cols.iter_mut().enumerate() {
            if col.set_low().is_err() {
                warn!("matrix: column {} select failed", c);
                continue;
            }
            self.delay.delay_us(self.timing.settle_us);
            for (r, row) in self.rows.iter_mut().enumerate() {
                // A pin that cannot be read counts as open.
                if row.is_low().unwrap_or(false) {
                    mask.set(r * COLS + c);
                }
            }
            if col.set_high().is_err() {
                warn!("matrix: column {} release failed", c);
            }
        }
        mask
    }
}

impl<I, O, D, const ROWS: usize, const COLS: usize> KeyScanner
    for MatrixScanner<I, O, D, ROWS, COLS>
where
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    fn scan(&mut self) -> KeyMask {
        MatrixScanner::scan(self)
    }
}

/// The board's full matrix fits a [`KeyMask`].
const _: () = assert!(KEY_COUNT <= 64);
