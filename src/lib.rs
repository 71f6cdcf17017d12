//! Input-scanning and report-synthesis core for matrix-hid.
//!
//! Everything here is pure logic over `embedded-hal` pins and a
//! [`chain::HidTransport`] seam, so it builds for the nRF52840 target and
//! runs on the host.
//!
//! Usage: `cargo test --lib` / `cargo test`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and is only built with `--features embedded`.
//!
//! Pipeline per poll tick:
//!
//! ```text
//! matrix ─▶ tracker ─▶ gesture ─▶ injector ─┐
//!                 └──▶ velocity ───────────┴─▶ report ─▶ chain ─▶ transport
//!                                                  ▲                 │
//!                                                  └── on_report_sent┘
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod hid;
pub mod injector;
pub mod keymap;
pub mod matrix;
pub mod report;
pub mod timer;
pub mod tracker;
pub mod velocity;

pub use chain::HidTransport;
pub use engine::Engine;
pub use error::Error;
pub use matrix::{KeyMask, KeyScanner};
