//! Unified error type for matrix-hid.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! None of these are fatal: the core logs them and retries on the next
//! poll tick or completion notification.

use crate::keymap::Direction;

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // USB
    /// The HID endpoint cannot take a report right now.
    NotReady,

    /// The host has not configured the USB device.
    Usb,
}

/// Ways a keymap can violate the direction binding invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeymapError {
    /// No key position is bound to this direction.
    MissingDirection(Direction),
    /// More than one key position is bound to this direction.
    DuplicateDirection(Direction),
}
