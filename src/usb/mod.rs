//! USB device subsystem: presents one composite HID interface to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`. Keyboard, mouse and consumer reports share a single
//! interrupt IN endpoint and are told apart by report ID; the keyboard LED
//! output report arrives on the OUT endpoint or via SET_REPORT.
//!
//! The engine never touches the endpoint directly. It queues a report
//! through [`UsbTransport`] and learns that the host took it from the
//! completion queue fed by [`hid_device::hid_writer_task`].

pub mod hid_device;
pub mod transport;

pub use transport::UsbTransport;
