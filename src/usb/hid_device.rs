//! USB HID composite device: keyboard + mouse + consumer on one interface.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral, tracks bus power state and runs the IN/OUT endpoint tasks.

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_sync::signal::Signal;
use embassy_usb::class::hid::{
    Config as HidConfig, HidReader, HidReaderWriter, HidWriter, OutResponse, ReportId as UsbReportId,
    RequestHandler, State,
};
use embassy_usb::{Builder, Config, Handler, UsbDevice};
use static_cell::StaticCell;

use matrix_hid::chain::WriterGate;
use matrix_hid::config;
use matrix_hid::hid::descriptor::{MAX_REPORT_SIZE, REPORT_DESCRIPTOR};
use matrix_hid::hid::{HidReport, KeyboardLeds, ReportId};

use super::transport::Completion;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;

/// OUT reports carry at most the report ID and the LED byte.
pub const MAX_OUT: usize = 2;

static HID_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static USB_POWER_HANDLER: StaticCell<UsbPowerHandler> = StaticCell::new();
static CONTROL_REQUEST_HANDLER: StaticCell<LedRequestHandler> = StaticCell::new();

static USB_CONFIGURED: AtomicBool = AtomicBool::new(false);
static USB_SUSPENDED: AtomicBool = AtomicBool::new(false);
static USB_WAKEUP_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static USB_LED_SIGNAL: Signal<CriticalSectionRawMutex, KeyboardLeds> = Signal::new();
static WRITER_GATE: WriterGate = WriterGate::new();

struct UsbPowerHandler;

impl Handler for UsbPowerHandler {
    fn configured(&mut self, configured: bool) {
        USB_CONFIGURED.store(configured, Ordering::Release);
        info!("USB configured={}", configured);
    }

    fn suspended(&mut self, suspended: bool) {
        USB_SUSPENDED.store(suspended, Ordering::Release);
        info!("USB suspended={}", suspended);
    }

    fn reset(&mut self) {
        USB_CONFIGURED.store(false, Ordering::Release);
    }
}

/// Keyboard LED output reports; input reports are never served over the
/// control pipe.
struct LedRequestHandler;

impl RequestHandler for LedRequestHandler {
    fn get_report(&mut self, id: UsbReportId, _buf: &mut [u8]) -> Option<usize> {
        info!("GET_REPORT {} rejected", defmt::Debug2Format(&id));
        None
    }

    fn set_report(&mut self, id: UsbReportId, data: &[u8]) -> OutResponse {
        match id {
            UsbReportId::Out(rid) if rid == ReportId::Keyboard as u8 => {
                // Interrupt OUT transfers keep the ID byte in front.
                let payload = match data {
                    [first, rest @ ..] if *first == rid && !rest.is_empty() => rest,
                    other => other,
                };
                match KeyboardLeds::from_output_report(payload) {
                    Some(leds) => {
                        USB_LED_SIGNAL.signal(leds);
                        OutResponse::Accepted
                    }
                    None => OutResponse::Rejected,
                }
            }
            _ => {
                warn!("SET_REPORT {} ignored", defmt::Debug2Format(&id));
                OutResponse::Rejected
            }
        }
    }
}

pub fn is_configured() -> bool {
    USB_CONFIGURED.load(Ordering::Acquire)
}

pub fn is_suspended() -> bool {
    USB_SUSPENDED.load(Ordering::Acquire)
}

/// Ask the device task to signal remote wakeup to the host.
pub fn request_wakeup() {
    USB_WAKEUP_SIGNAL.signal(());
}

/// Held from the moment a report is queued until its write finishes.
pub fn writer_gate() -> &'static WriterGate {
    &WRITER_GATE
}

/// Latest keyboard LED state from the host.
pub fn led_signal() -> &'static Signal<CriticalSectionRawMutex, KeyboardLeds> {
    &USB_LED_SIGNAL
}

/// Build result containing the USB device runner and the HID endpoints.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub reader: HidReader<'static, UsbDriver, MAX_OUT>,
    pub writer: HidWriter<'static, UsbDriver, MAX_REPORT_SIZE>,
}

/// Initialise the USB stack and create the composite HID device.
///
/// Must be called exactly once. All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbHidDevice {
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;
    usb_config.supports_remote_wakeup = true;

    let mut builder = Builder::new(
        driver,
        usb_config,
        USB_CONFIG_DESC.init([0u8; 256]),
        USB_BOS_DESC.init([0u8; 256]),
        USB_MSOS_DESC.init([0u8; 256]),
        USB_CTRL_BUF.init([0u8; 128]),
    );

    builder.handler(USB_POWER_HANDLER.init(UsbPowerHandler));

    let hid_config = HidConfig {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: Some(CONTROL_REQUEST_HANDLER.init(LedRequestHandler)),
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 64,
    };
    let hid = HidReaderWriter::<_, MAX_OUT, MAX_REPORT_SIZE>::new(
        &mut builder,
        HID_STATE.init(State::new()),
        hid_config,
    );
    let (reader, writer) = hid.split();

    let device = builder.build();

    info!("USB HID composite device initialised (keyboard + mouse + consumer)");

    UsbHidDevice { device, reader, writer }
}

/// Run the USB device stack. Must be spawned as a dedicated Embassy task.
///
/// Services enumeration and endpoints until the host suspends the bus, then
/// waits for either a host resume or a local wakeup request.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    loop {
        device.run_until_suspend().await;
        match select(device.wait_resume(), USB_WAKEUP_SIGNAL.wait()).await {
            Either::First(()) => info!("USB resumed by host"),
            Either::Second(()) => {
                info!("USB remote wakeup");
                if let Err(e) = device.remote_wakeup().await {
                    warn!("USB remote wakeup failed: {}", defmt::Debug2Format(&e));
                }
            }
        }
    }
}

/// Serve keyboard LED output reports on the OUT endpoint.
pub async fn hid_reader_task(reader: HidReader<'static, UsbDriver, MAX_OUT>) -> ! {
    let mut handler = LedRequestHandler;
    reader.run(true, &mut handler).await
}

/// HID report forwarding task: takes queued reports from the engine, writes
/// them to the IN endpoint and reports each one the host accepted.
pub async fn hid_writer_task(
    mut writer: HidWriter<'static, UsbDriver, MAX_REPORT_SIZE>,
    report_rx: Receiver<'static, CriticalSectionRawMutex, HidReport, { config::REPORT_QUEUE_DEPTH }>,
    completion_tx: Sender<'static, CriticalSectionRawMutex, Completion, { config::REPORT_QUEUE_DEPTH }>,
) -> ! {
    info!("HID writer task started - waiting for reports");

    let mut buf = [0u8; MAX_REPORT_SIZE];

    loop {
        let report = report_rx.receive().await;
        let n = report.serialize_with_id(&mut buf);
        let result = writer.write(&buf[..n]).await;
        WRITER_GATE.release();
        match result {
            Ok(()) => completion_tx.send(Completion::of(&report)).await,
            Err(e) => warn!("USB {} write failed: {}", report.id(), defmt::Debug2Format(&e)),
        }
    }
}
