//! Press history and double-tap detection.
//!
//! Every rising edge is logged into a fixed ring of [`KeyEvent`]s. Double
//! taps are decided from the last press time of each direction only; the
//! ring is kept as an observable record of recent input.

use heapless::{HistoryBuffer, Vec};

use crate::config::{DOUBLE_TAP_WINDOW_MS, HISTORY_SIZE};
use crate::keymap::{Direction, Keymap, DIRECTION_COUNT};
use crate::matrix::KeyMask;

/// One press, stamped with the tick time it was seen on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    /// Monotonic milliseconds.
    pub t_ms: u32,
    /// Key position (`row * COLS + col`).
    pub key: u8,
}

/// Timing-derived input pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    DoubleTap(Direction),
}

/// At most one gesture per direction per tick.
pub type Gestures = Vec<Gesture, DIRECTION_COUNT>;

pub struct GestureDetector {
    history: HistoryBuffer<KeyEvent, HISTORY_SIZE>,
    last_press: [Option<u32>; DIRECTION_COUNT],
    window_ms: u32,
}

impl GestureDetector {
    pub const fn new(window_ms: u32) -> Self {
        Self {
            history: HistoryBuffer::new(),
            last_press: [None; DIRECTION_COUNT],
            window_ms,
        }
    }

    /// Record this tick's presses and report any double taps.
    ///
    /// Directions are evaluated independently in [`Direction::ALL`] order.
    /// A direction's first press has nothing to pair with and never taps.
    pub fn observe(&mut self, pressed: KeyMask, now: u32, keymap: &Keymap) -> Gestures {
        let mut gestures = Gestures::new();
        if pressed.is_empty() {
            return gestures;
        }

        for key in pressed.keys() {
            self.history.write(KeyEvent {
                t_ms: now,
                key: key as u8,
            });
        }

        for dir in Direction::ALL {
            if !pressed.contains(keymap.direction_key(dir)) {
                continue;
            }
            let Some(last) = self.last_press[dir.index()].replace(now) else {
                continue;
            };
            let delta = now.wrapping_sub(last);
            if delta <= self.window_ms {
                debug!("gesture: double tap {} ({} ms)", dir, delta);
                // Capacity equals the direction count, so this cannot fail.
                let _ = gestures.push(Gesture::DoubleTap(dir));
            }
        }
        gestures
    }

    /// Logged presses, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &KeyEvent> {
        self.history.oldest_ordered()
    }

}

impl Default for GestureDetector {
    fn default() -> Self {
        Self::new(DOUBLE_TAP_WINDOW_MS)
    }
}
