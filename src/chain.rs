//! Report chain bookkeeping and the transport seam.
//!
//! One report is in flight at a time. The chain remembers which profile
//! that is, so a completion notification can only advance the chain it
//! belongs to, and it remembers the last report accepted per profile so
//! unchanged state is not resent.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::Error;
use crate::hid::{ConsumerReport, HidReport, KeyboardReport, MouseReport, ReportId};

/// HID transport as seen from the core.
///
/// Implemented over the USB stack on target and by recorders in tests.
/// `on_report_sent` notifications flow the other way, into
/// [`crate::engine::Engine::on_report_sent`].
pub trait HidTransport {
    /// Can a report be queued right now?
    fn is_ready(&self) -> bool;
    /// Has the host suspended the bus?
    fn is_suspended(&self) -> bool;
    /// Ask the host to resume the bus.
    fn remote_wakeup(&mut self);

    fn send_keyboard(&mut self, report: &KeyboardReport) -> Result<(), Error>;
    fn send_mouse(&mut self, report: &MouseReport) -> Result<(), Error>;
    fn send_consumer(&mut self, report: &ConsumerReport) -> Result<(), Error>;
}

pub struct ReportChain {
    in_flight: Option<ReportId>,
    last_keyboard: KeyboardReport,
    last_mouse: MouseReport,
    last_consumer: ConsumerReport,
}

impl ReportChain {
    pub const fn new() -> Self {
        Self {
            in_flight: None,
            last_keyboard: KeyboardReport::empty(),
            last_mouse: MouseReport::empty(),
            last_consumer: ConsumerReport::empty(),
        }
    }

    /// Would sending `report` tell the host anything new?
    ///
    /// Keyboard and consumer reports go out on change only. Mouse reports
    /// are relative, so any movement goes out. An idle mouse report is
    /// suppressed unless it releases buttons the host still sees held.
    pub fn pending(&self, report: &HidReport) -> bool {
        match report {
            HidReport::Keyboard(k) => *k != self.last_keyboard,
            HidReport::Mouse(m) => !m.is_idle() || self.last_mouse.buttons != 0,
            HidReport::Consumer(c) => *c != self.last_consumer,
        }
    }

    /// Hand `report` to the transport. A transport that is not ready, or
    /// that refuses the report, leaves the chain untouched for a retry.
    pub fn send<T: HidTransport>(&mut self, transport: &mut T, report: HidReport) -> bool {
        if !transport.is_ready() {
            debug!("chain: transport busy, {} skipped", report.id());
            return false;
        }
        let result = match &report {
            HidReport::Keyboard(k) => transport.send_keyboard(k),
            HidReport::Mouse(m) => transport.send_mouse(m),
            HidReport::Consumer(c) => transport.send_consumer(c),
        };
        if let Err(e) = result {
            debug!("chain: {} not sent: {}", report.id(), e);
            return false;
        }
        match report {
            HidReport::Keyboard(k) => self.last_keyboard = k,
            HidReport::Mouse(m) => self.last_mouse = m,
            HidReport::Consumer(c) => self.last_consumer = c,
        }
        self.in_flight = Some(report.id());
        true
    }

    /// Accept a completion for `id`. Returns `false` if `id` is not the
    /// report in flight.
    pub fn complete(&mut self, id: ReportId) -> bool {
        if self.in_flight == Some(id) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self) -> Option<ReportId> {
        self.in_flight
    }
}

impl Default for ReportChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Busy flag shared by the task that queues reports and the task that
/// writes them to the endpoint.
///
/// Claimed when a report is queued and released once its endpoint write
/// has finished, so it stays set while the report waits in the queue and
/// while it is on the wire.
pub struct WriterGate {
    busy: AtomicBool,
}

impl WriterGate {
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Take the writer for one report. `false` if one is already pending.
    pub fn try_claim(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl Default for WriterGate {
    fn default() -> Self {
        Self::new()
    }
}
