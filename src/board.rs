//! nRF52840 pin assignment for the key matrix and status LED.
//!
//! Rows are sense inputs with internal pull-ups; columns idle high and are
//! pulled low one at a time by the scanner.

use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::{peripherals, Peripherals};
use embassy_time::Delay;

use matrix_hid::config::{MATRIX_COLS, MATRIX_ROWS};
use matrix_hid::matrix::{MatrixScanner, ScanTiming};

pub type Scanner = MatrixScanner<Input<'static>, Output<'static>, Delay, MATRIX_ROWS, MATRIX_COLS>;

pub struct Board {
    pub scanner: Scanner,
    /// Lit while Caps Lock is on.
    pub led: Output<'static>,
    pub usbd: peripherals::USBD,
}

impl Board {
    pub fn new(p: Peripherals) -> Self {
        let rows = [
            Input::new(p.P0_02, Pull::Up),
            Input::new(p.P0_03, Pull::Up),
            Input::new(p.P0_04, Pull::Up),
            Input::new(p.P0_05, Pull::Up),
            Input::new(p.P0_28, Pull::Up),
            Input::new(p.P0_29, Pull::Up),
        ];
        let cols = [
            Output::new(p.P1_01, Level::High, OutputDrive::Standard),
            Output::new(p.P1_02, Level::High, OutputDrive::Standard),
            Output::new(p.P1_03, Level::High, OutputDrive::Standard),
            Output::new(p.P1_04, Level::High, OutputDrive::Standard),
            Output::new(p.P1_05, Level::High, OutputDrive::Standard),
            Output::new(p.P1_06, Level::High, OutputDrive::Standard),
            Output::new(p.P1_07, Level::High, OutputDrive::Standard),
            Output::new(p.P1_08, Level::High, OutputDrive::Standard),
            Output::new(p.P1_10, Level::High, OutputDrive::Standard),
            Output::new(p.P1_11, Level::High, OutputDrive::Standard),
        ];

        Self {
            scanner: MatrixScanner::new(rows, cols, Delay, ScanTiming::default()),
            // Active-low LED on the DK.
            led: Output::new(p.P0_13, Level::High, OutputDrive::Standard),
            usbd: p.USBD,
        }
    }
}
