//! Application-wide constants and compile-time configuration.
//!
//! All matrix geometry, timing parameters, and protocol constants live
//! here so they can be tuned in one place.

// Matrix

/// Number of row (sense) lines.
pub const MATRIX_ROWS: usize = 6;

/// Number of column (select) lines.
pub const MATRIX_COLS: usize = 10;

/// Total number of key positions; bit index = `row * MATRIX_COLS + col`.
pub const KEY_COUNT: usize = MATRIX_ROWS * MATRIX_COLS;

/// Minimum time a column must be held active before rows are sampled (µs).
///
/// Covers the RC settling time of the column trace and the row pull-ups.
pub const SETTLE_MICROS: u32 = 5;

// Timing

/// Poll tick period (ms). Hold counters count in units of this period.
pub const POLL_INTERVAL_MS: u32 = 10;

/// Maximum gap between two presses of one direction that still counts as
/// a double tap (ms, inclusive).
pub const DOUBLE_TAP_WINDOW_MS: u32 = 200;

/// Hold counters saturate here instead of wrapping.
pub const HOLD_TICKS_CEILING: u32 = u32::MAX;

/// Number of press events kept in the history ring.
pub const HISTORY_SIZE: usize = 10;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "matrix-hid";
pub const USB_PRODUCT: &str = "Matrix Keyboard + Mouse";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 1;

/// Depth of the queue between the report chain and the USB writer.
///
/// One slot is enough: the chain never has more than one report in flight.
pub const REPORT_QUEUE_DEPTH: usize = 1;

// GPIO pin assignments (nRF52840-DK friendly)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `board.rs`.  Adjust for your custom PCB.
//
//   Row 0..5       → P0.02, P0.03, P0.04, P0.05, P0.28, P0.29   (inputs, pull-up)
//   Column 0..9    → P1.01 .. P1.08, P1.10, P1.11                (outputs, idle high)
//   Status LED     → P0.13
