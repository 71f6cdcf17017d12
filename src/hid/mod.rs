//! HID report types for the three profiles the device exposes.
//!
//! Each profile has its own report ID. The report chain walks the IDs in
//! ascending order, so [`ReportId::next`] defines the chain order.

pub mod consumer;
pub mod descriptor;
pub mod keyboard;
pub mod mouse;


pub use consumer::ConsumerReport;
pub use keyboard::{KeyboardLeds, KeyboardReport};
pub use mouse::MouseReport;

/// Report ID of each profile, in chain order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ReportId {
    Keyboard = 1,
    Mouse = 2,
    Consumer = 3,
}

impl ReportId {
    pub fn from_u8(id: u8) -> Option<Self> {
        match id {
            1 => Some(ReportId::Keyboard),
            2 => Some(ReportId::Mouse),
            3 => Some(ReportId::Consumer),
            _ => None,
        }
    }

    /// The profile after this one, or `None` at the end of the chain.
    pub fn next(self) -> Option<Self> {
        Self::from_u8(self as u8 + 1)
    }
}

/// A report for any profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidReport {
    Keyboard(KeyboardReport),
    Mouse(MouseReport),
    Consumer(ConsumerReport),
}

impl HidReport {
    pub fn id(&self) -> ReportId {
        match self {
            HidReport::Keyboard(_) => ReportId::Keyboard,
            HidReport::Mouse(_) => ReportId::Mouse,
            HidReport::Consumer(_) => ReportId::Consumer,
        }
    }

    /// Serialise the payload only. Returns bytes written, 0 if `buf` is
    /// too small.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match self {
            HidReport::Keyboard(k) => k.serialize(buf),
            HidReport::Mouse(m) => m.serialize(buf),
            HidReport::Consumer(c) => c.serialize(buf),
        }
    }

    /// Serialise as it goes on the wire: report ID, then payload.
    pub fn serialize_with_id(&self, buf: &mut [u8]) -> usize {
        let Some((first, rest)) = buf.split_first_mut() else {
            return 0;
        };
        let n = self.serialize(rest);
        if n == 0 {
            return 0;
        }
        *first = self.id() as u8;
        n + 1
    }
}
