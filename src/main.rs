//! Firmware entry point: nRF52840 key matrix to USB HID.
//!
//! One task owns the [`Engine`] and alternates between the poll ticker and
//! report completions, so the two engine entry points never overlap. The
//! USB stack, endpoint tasks and LED indicator run beside it.

#![no_std]
#![no_main]

mod board;
mod usb;

use defmt::info;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::Output;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Ticker};
use {defmt_rtt as _, panic_probe as _};

use matrix_hid::config::POLL_INTERVAL_MS;
use matrix_hid::hid::descriptor::MAX_REPORT_SIZE;
use matrix_hid::Engine;

use crate::board::Board;
use crate::usb::hid_device::{self, UsbDriver, MAX_OUT};
use crate::usb::transport::{CompletionQueue, ReportQueue};
use crate::usb::UsbTransport;

static REPORT_QUEUE: ReportQueue = Channel::new();
static COMPLETION_QUEUE: CompletionQueue = Channel::new();

#[embassy_executor::task]
async fn usb_device_task(device: embassy_usb::UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn hid_reader_task(reader: embassy_usb::class::hid::HidReader<'static, UsbDriver, MAX_OUT>) -> ! {
    hid_device::hid_reader_task(reader).await
}

#[embassy_executor::task]
async fn hid_writer_task(writer: embassy_usb::class::hid::HidWriter<'static, UsbDriver, MAX_REPORT_SIZE>) -> ! {
    hid_device::hid_writer_task(writer, REPORT_QUEUE.receiver(), COMPLETION_QUEUE.sender()).await
}

/// Mirror the host's Caps Lock state on the status LED.
#[embassy_executor::task]
async fn led_task(mut led: Output<'static>) -> ! {
    loop {
        let leds = hid_device::led_signal().wait().await;
        info!("host LEDs: caps={} num={} scroll={}", leds.caps_lock(), leds.num_lock(), leds.scroll_lock());
        if leds.caps_lock() {
            led.set_low();
        } else {
            led.set_high();
        }
    }
}

/// Monotonic milliseconds, truncated. The poll timer and gesture window
/// both compare with wrapping arithmetic.
fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("matrix-hid starting");

    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.hfclk_source = embassy_nrf::config::HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(nrf_config);

    let Board {
        mut scanner,
        led,
        usbd,
    } = Board::new(p);

    let usb = hid_device::init(usbd);
    spawner.must_spawn(usb_device_task(usb.device));
    spawner.must_spawn(hid_reader_task(usb.reader));
    spawner.must_spawn(hid_writer_task(usb.writer));
    spawner.must_spawn(led_task(led));

    let mut engine = Engine::default();
    let mut transport = UsbTransport::new(&REPORT_QUEUE);
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(POLL_INTERVAL_MS)));

    info!("engine running, poll every {} ms", POLL_INTERVAL_MS);

    loop {
        match select(ticker.next(), COMPLETION_QUEUE.receive()).await {
            Either::First(()) => {
                engine.poll(now_ms(), &mut scanner, &mut transport);
            }
            Either::Second(done) => {
                engine.on_report_sent(done.report_id, &done.payload, &mut scanner, &mut transport);
            }
        }
    }
}
