//! Per-key edge detection and hold counting.
//!
//! Runs once per poll tick. A key's hold counter is the number of ticks it
//! has been continuously down, counted from 0 on the tick it was pressed.

use crate::config::{HOLD_TICKS_CEILING, KEY_COUNT};
use crate::matrix::KeyMask;

/// Edges between the previous tick and this one.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEdges {
    pub pressed: KeyMask,
    pub released: KeyMask,
}

/// Owns the previous mask and the hold counters.
pub struct KeyStateTracker {
    prev: KeyMask,
    hold: [u32; KEY_COUNT],
}

impl KeyStateTracker {
    pub const fn new() -> Self {
        Self {
            prev: KeyMask::EMPTY,
            hold: [0; KEY_COUNT],
        }
    }

    /// Classify edges against the previous tick and advance hold counters.
    pub fn update(&mut self, raw: KeyMask) -> KeyEdges {
        let edges = KeyEdges {
            pressed: raw.rising(self.prev),
            released: raw.falling(self.prev),
        };

        for (key, ticks) in self.hold.iter_mut().enumerate() {
            *ticks = if !raw.contains(key) || edges.pressed.contains(key) {
                0
            } else {
                ticks.saturating_add(1).min(HOLD_TICKS_CEILING)
            };
        }

        self.prev = raw;
        edges
    }

    /// Ticks `key` has been held; 0 for released or unknown keys.
    pub fn hold_ticks(&self, key: usize) -> u32 {
        self.hold.get(key).copied().unwrap_or(0)
    }
}

impl Default for KeyStateTracker {
    fn default() -> Self {
        Self::new()
    }
}
