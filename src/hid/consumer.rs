//! Consumer Control HID support - media keys, volume, etc.
//!
//! Consumer Control is a separate HID usage page (0x0C). It is sent as its
//! own report ID after the keyboard and mouse reports in the chain.

/// Consumer control report size (2 bytes for usage ID).
pub const CONSUMER_REPORT_SIZE: usize = 2;

/// Common consumer control usage codes (Usage Page 0x0C).
pub mod usage {
    pub const PLAY_PAUSE: u16 = 0x00CD;
    pub const NEXT_TRACK: u16 = 0x00B5;
    pub const PREV_TRACK: u16 = 0x00B6;
    pub const STOP: u16 = 0x00B7;
    pub const MUTE: u16 = 0x00E2;
    pub const VOLUME_UP: u16 = 0x00E9;
    pub const VOLUME_DOWN: u16 = 0x00EA;
}

/// Consumer control report: a single 16-bit usage, 0 = nothing pressed.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsumerReport {
    pub usage: u16,
}

impl ConsumerReport {
    pub const fn new(usage: u16) -> Self {
        Self { usage }
    }

    pub const fn empty() -> Self {
        Self { usage: 0 }
    }

    /// Serialise (little-endian). Returns the number of bytes written.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < CONSUMER_REPORT_SIZE {
            return 0;
        }
        buf[..CONSUMER_REPORT_SIZE].copy_from_slice(&self.usage.to_le_bytes());
        CONSUMER_REPORT_SIZE
    }
}
