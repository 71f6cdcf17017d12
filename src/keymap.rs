//! Static key-position → action table.
//!
//! Every bit of a [`KeyMask`] is looked up here to decide which report it
//! feeds: a keyboard keycode, a modifier bit, a pointer direction, a mouse
//! button, a scroll step, or a consumer-control usage.
//!
//! The four pointer directions double as the gesture inputs, so each one
//! must be bound to exactly one key position. [`Keymap::new`] checks this
//! and is `const`, which lets [`DEFAULT_KEYMAP`] be validated at compile
//! time.

use crate::config::KEY_COUNT;
use crate::error::KeymapError;
use crate::hid::consumer::usage;
use crate::hid::keyboard::{keycode, modifier};
use crate::hid::mouse::button;
use crate::matrix::KeyMask;

/// Logical pointer direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

/// Number of logical directions.
pub const DIRECTION_COUNT: usize = 4;

impl Direction {
    /// Fixed evaluation order used wherever directions are iterated.
    pub const ALL: [Direction; DIRECTION_COUNT] =
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// Dense index into per-direction tables.
    pub const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }
}

/// What a single key position does when it is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// Unpopulated position.
    None,
    /// Keyboard usage code (page 0x07).
    Key(u8),
    /// Bit(s) OR-ed into the keyboard modifier byte.
    Modifier(u8),
    /// Accelerated pointer movement; also the gesture input.
    Pointer(Direction),
    /// Mouse button bit(s).
    Button(u8),
    /// One wheel (Up/Down) or pan (Left/Right) step per report.
    Scroll(Direction),
    /// Consumer-control usage (page 0x0C).
    Consumer(u16),
}

/// Validated keymap.
#[derive(Clone, Debug)]
pub struct Keymap {
    actions: [KeyAction; KEY_COUNT],
    /// Key position bound to each direction, indexed by [`Direction::index`].
    direction_keys: [u8; DIRECTION_COUNT],
}

impl Keymap {
    /// Build a keymap, checking that every direction has exactly one
    /// pointer key.
    pub const fn new(actions: [KeyAction; KEY_COUNT]) -> Result<Self, KeymapError> {
        let mut slots: [Option<u8>; DIRECTION_COUNT] = [None; DIRECTION_COUNT];
        let mut key = 0;
        while key < KEY_COUNT {
            if let KeyAction::Pointer(dir) = actions[key] {
                if slots[dir.index()].is_some() {
                    return Err(KeymapError::DuplicateDirection(dir));
                }
                slots[dir.index()] = Some(key as u8);
            }
            key += 1;
        }

        let mut direction_keys = [0u8; DIRECTION_COUNT];
        let mut i = 0;
        while i < DIRECTION_COUNT {
            match slots[i] {
                Some(key) => direction_keys[i] = key,
                None => return Err(KeymapError::MissingDirection(Direction::ALL[i])),
            }
            i += 1;
        }

        Ok(Self {
            actions,
            direction_keys,
        })
    }

    /// Action bound to a key position; out-of-range positions are `None`.
    pub fn action(&self, key: usize) -> KeyAction {
        self.actions.get(key).copied().unwrap_or(KeyAction::None)
    }

    /// Key position bound to `dir`.
    pub fn direction_key(&self, dir: Direction) -> usize {
        self.direction_keys[dir.index()] as usize
    }

    /// Single-bit mask of the key bound to `dir`.
    pub fn direction_mask(&self, dir: Direction) -> KeyMask {
        KeyMask::bit(self.direction_key(dir))
    }
}

impl Default for Keymap {
    fn default() -> Self {
        DEFAULT_KEYMAP
    }
}

use KeyAction::{Button as Btn, Consumer as Cc, Key as K, Modifier as Mod, Pointer as Ptr, Scroll as Sc};

/// Board layout, row by row (`row * 10 + col`).
///
/// Row 0 carries the pointer cluster; the directions sit on bits 0..=3 so
/// `Up = 0b0001`, `Down = 0b0010`, `Left = 0b0100`, `Right = 0b1000`.
#[rustfmt::skip]
pub const DEFAULT_LAYOUT: [KeyAction; KEY_COUNT] = [
    // Row 0: pointer cluster
    Ptr(Direction::Up), Ptr(Direction::Down), Ptr(Direction::Left), Ptr(Direction::Right),
    Btn(button::LEFT), Btn(button::RIGHT), Sc(Direction::Up), Sc(Direction::Down),
    K(keycode::ESCAPE), K(keycode::TAB),
    // Row 1: digits
    K(keycode::N1), K(keycode::N2), K(keycode::N3), K(keycode::N4), K(keycode::N5),
    K(keycode::N6), K(keycode::N7), K(keycode::N8), K(keycode::N9), K(keycode::N0),
    // Row 2
    K(keycode::Q), K(keycode::W), K(keycode::E), K(keycode::R), K(keycode::T),
    K(keycode::Y), K(keycode::U), K(keycode::I), K(keycode::O), K(keycode::P),
    // Row 3
    K(keycode::A), K(keycode::S), K(keycode::D), K(keycode::F), K(keycode::G),
    K(keycode::H), K(keycode::J), K(keycode::K), K(keycode::L), K(keycode::ENTER),
    // Row 4
    Mod(modifier::LEFT_SHIFT), K(keycode::Z), K(keycode::X), K(keycode::C), K(keycode::V),
    K(keycode::B), K(keycode::N), K(keycode::M), K(keycode::BACKSPACE), Mod(modifier::RIGHT_SHIFT),
    // Row 5
    Mod(modifier::LEFT_CTRL), Mod(modifier::LEFT_GUI), Mod(modifier::LEFT_ALT), K(keycode::SPACE),
    Cc(usage::VOLUME_DOWN), Cc(usage::VOLUME_UP), Cc(usage::MUTE), Cc(usage::PLAY_PAUSE),
    Mod(modifier::RIGHT_ALT), Mod(modifier::RIGHT_CTRL),
];

/// [`DEFAULT_LAYOUT`], validated at compile time.
pub const DEFAULT_KEYMAP: Keymap = match Keymap::new(DEFAULT_LAYOUT) {
    Ok(keymap) => keymap,
    Err(_) => panic!("default layout must bind every direction exactly once"),
};
