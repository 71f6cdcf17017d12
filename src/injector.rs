//! Two-stage keyboard macro injection.
//!
//! A configured double tap arms a chord (modifiers + one key). While armed,
//! the keyboard profile reports the chord instead of the live key state.
//! Once the host has taken the chord, the next keyboard completion releases
//! everything and normal reporting resumes.
//!
//! ```text
//!            DoubleTap(d), d configured
//!   Idle ─────────────────────────────────▶ AwaitingPress(chord)
//!    ▲                                           │
//!    │ Sent(keyboard) / SendRelease              │ Sent(keyboard, chord)
//!    │                                           ▼
//!    └──────────────────────────────────── AwaitingRelease(chord)
//! ```
//!
//! Gestures that arrive while not idle are dropped.

use crate::gesture::Gesture;
use crate::hid::keyboard::{keycode, modifier};
use crate::hid::{KeyboardReport, ReportId};
use crate::keymap::{Direction, DIRECTION_COUNT};

/// Modifier bits plus a single key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Chord {
    pub modifier: u8,
    pub key: u8,
}

impl Chord {
    pub const fn report(self) -> KeyboardReport {
        KeyboardReport::chord(self.modifier, self.key)
    }
}

/// Chord injected for a double tap of each direction, by [`Direction::index`].
pub type MacroTable = [Option<Chord>; DIRECTION_COUNT];

/// Right double tap → Alt+Tab, Left double tap → Alt+Shift+Tab.
pub const DEFAULT_MACROS: MacroTable = [
    None,
    Some(Chord {
        modifier: modifier::LEFT_ALT,
        key: keycode::TAB,
    }),
    None,
    Some(Chord {
        modifier: modifier::LEFT_ALT | modifier::LEFT_SHIFT,
        key: keycode::TAB,
    }),
];

const _: () = assert!(Direction::Right.index() == 1 && Direction::Left.index() == 3);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroState {
    #[default]
    Idle,
    /// Chord armed; waiting for the host to confirm it.
    AwaitingPress(KeyboardReport),
    /// Chord delivered; the next keyboard completion releases it.
    AwaitingRelease(KeyboardReport),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MacroEvent<'a> {
    Gesture(Gesture),
    /// A report finished transmitting.
    Sent { id: ReportId, payload: &'a [u8] },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroAction {
    None,
    /// A chord was armed.
    Armed,
    /// Send an all-released keyboard report now and end the chain.
    SendRelease,
}

/// Pure transition function.
pub fn step(state: MacroState, event: MacroEvent<'_>, table: &MacroTable) -> (MacroState, MacroAction) {
    match (state, event) {
        (MacroState::Idle, MacroEvent::Gesture(Gesture::DoubleTap(dir))) => {
            match table[dir.index()] {
                Some(chord) => (MacroState::AwaitingPress(chord.report()), MacroAction::Armed),
                None => (state, MacroAction::None),
            }
        }
        (MacroState::AwaitingPress(chord), MacroEvent::Sent { id: ReportId::Keyboard, payload })
            if KeyboardReport::from_bytes(payload) == Some(chord) =>
        {
            (MacroState::AwaitingRelease(chord), MacroAction::None)
        }
        (MacroState::AwaitingRelease(_), MacroEvent::Sent { id: ReportId::Keyboard, .. }) => {
            (MacroState::Idle, MacroAction::SendRelease)
        }
        _ => (state, MacroAction::None),
    }
}

/// Owns the macro state and its trigger table.
pub struct MacroInjector {
    state: MacroState,
    table: MacroTable,
}

impl MacroInjector {
    pub const fn new(table: MacroTable) -> Self {
        Self {
            state: MacroState::Idle,
            table,
        }
    }

    pub fn handle(&mut self, event: MacroEvent<'_>) -> MacroAction {
        let (next, action) = step(self.state, event, &self.table);
        if next != self.state {
            debug!("macro: {} -> {}", self.state, next);
        }
        self.state = next;
        action
    }

    pub fn state(&self) -> MacroState {
        self.state
    }

    /// Keyboard payload that overrides live state while a macro runs.
    pub fn payload(&self) -> Option<KeyboardReport> {
        match self.state {
            MacroState::Idle => None,
            MacroState::AwaitingPress(chord) | MacroState::AwaitingRelease(chord) => Some(chord),
        }
    }
}

impl Default for MacroInjector {
    fn default() -> Self {
        Self::new(DEFAULT_MACROS)
    }
}
