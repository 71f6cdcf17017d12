//! [`HidTransport`] over the Embassy report queue.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use heapless::Vec;

use matrix_hid::config::REPORT_QUEUE_DEPTH;
use matrix_hid::hid::descriptor::MAX_REPORT_SIZE;
use matrix_hid::hid::{ConsumerReport, HidReport, KeyboardReport, MouseReport};
use matrix_hid::{Error, HidTransport};

use super::hid_device;

pub type ReportQueue = Channel<CriticalSectionRawMutex, HidReport, REPORT_QUEUE_DEPTH>;
pub type CompletionQueue = Channel<CriticalSectionRawMutex, Completion, REPORT_QUEUE_DEPTH>;

/// A report the host has taken off the IN endpoint.
#[derive(Clone, Debug, defmt::Format)]
pub struct Completion {
    pub report_id: u8,
    pub payload: Vec<u8, MAX_REPORT_SIZE>,
}

impl Completion {
    pub fn of(report: &HidReport) -> Self {
        let mut buf = [0u8; MAX_REPORT_SIZE];
        let n = report.serialize(&mut buf);
        Self {
            report_id: report.id() as u8,
            payload: Vec::from_slice(&buf[..n]).unwrap_or_default(),
        }
    }
}

pub struct UsbTransport {
    queue: &'static ReportQueue,
}

impl UsbTransport {
    pub fn new(queue: &'static ReportQueue) -> Self {
        Self { queue }
    }

    fn enqueue(&mut self, report: HidReport) -> Result<(), Error> {
        if !hid_device::is_configured() {
            return Err(Error::Usb);
        }
        let gate = hid_device::writer_gate();
        if !gate.try_claim() {
            return Err(Error::NotReady);
        }
        self.queue.try_send(report).map_err(|_: TrySendError<HidReport>| {
            gate.release();
            Error::NotReady
        })
    }
}

impl HidTransport for UsbTransport {
    fn is_ready(&self) -> bool {
        hid_device::is_configured() && !hid_device::writer_gate().is_busy()
    }

    fn is_suspended(&self) -> bool {
        hid_device::is_suspended()
    }

    fn remote_wakeup(&mut self) {
        hid_device::request_wakeup();
    }

    fn send_keyboard(&mut self, report: &KeyboardReport) -> Result<(), Error> {
        self.enqueue(HidReport::Keyboard(*report))
    }

    fn send_mouse(&mut self, report: &MouseReport) -> Result<(), Error> {
        self.enqueue(HidReport::Mouse(*report))
    }

    fn send_consumer(&mut self, report: &ConsumerReport) -> Result<(), Error> {
        self.enqueue(HidReport::Consumer(*report))
    }
}
