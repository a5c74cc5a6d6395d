//! Volume Knob Main Application
//!
//! Entry point for the STM32G474-based USB volume knob.
//! Initializes hardware, polls the encoder and serves the host link.

#![no_std]
#![no_main]

use defmt::{debug, info, warn};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Flex, Level, Output, Speed};
use embassy_stm32::usb::Driver;
use embassy_stm32::{bind_interrupts, peripherals, usb};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Ticker, Timer};
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::{Builder, UsbDevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use volume_knob::config::{
    CONTROL_QUEUE_DEPTH, DEFAULT_PULL_UPS, POLL_INTERVAL_US, USB_CDC_PACKET_SIZE,
};
use volume_knob::hal::gpio::FlexLines;
use volume_knob::knob::Knob;
use volume_knob::types::ControlCode;
use volume_knob::usb::cdc::{self, UsbDeviceInfo, UsbStrings};

bind_interrupts!(struct Irqs {
    USB_LP => usb::InterruptHandler<peripherals::USB>;
});

type UsbDriver = Driver<'static, peripherals::USB>;

/// Control codes waiting for the USB writer
static CONTROL_CODES: Channel<CriticalSectionRawMutex, ControlCode, CONTROL_QUEUE_DEPTH> =
    Channel::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Volume Knob Firmware v{}", env!("CARGO_PKG_VERSION"));

    // USB needs the 48 MHz HSI trimmed from SOF packets
    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::{mux, Hsi48Config};
        config.rcc.hsi48 = Some(Hsi48Config {
            sync_from_usb: true,
        });
        config.rcc.mux.clk48sel = mux::Clk48sel::HSI48;
    }
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    // Encoder module: PA0 = CLK, PA1 = DT, PA2 = SW
    let lines = FlexLines::new(Flex::new(p.PA0), Flex::new(p.PA1), Flex::new(p.PA2));
    let led = Output::new(p.PA5, Level::Low, Speed::Low);

    // PA12 = D+, PA11 = D-
    let driver = Driver::new(p.USB, Irqs, p.PA12, p.PA11);
    let info = UsbDeviceInfo::default();
    info!("Enumerating as {}", info);

    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static CDC_STATE: StaticCell<State<'static>> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        cdc::usb_config(info, &UsbStrings::default()),
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [],
        CONTROL_BUF.init([0; 64]),
    );
    let mut class = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), USB_CDC_PACKET_SIZE);
    let device = builder.build();

    spawner.spawn(usb_task(device)).unwrap();
    spawner.spawn(knob_task(lines)).unwrap();
    spawner.spawn(heartbeat_task(led)).unwrap();

    info!("Tasks spawned, serving host link");

    cdc::serve(&mut class, CONTROL_CODES.receiver()).await
}

/// Runs the USB device state machine
#[embassy_executor::task]
async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    device.run().await
}

/// Polls the encoder module at a fixed rate
#[embassy_executor::task]
async fn knob_task(mut lines: FlexLines<'static>) {
    let mut knob = Knob::on_module();
    knob.begin(&mut lines, DEFAULT_PULL_UPS);

    let mut ticker = Ticker::every(Duration::from_micros(POLL_INTERVAL_US));
    loop {
        if let Some(code) = knob.poll(&mut lines) {
            debug!("knob {} (position {})", code, knob.position());
            if CONTROL_CODES.try_send(code).is_err() {
                warn!("control queue full, dropped {}", code);
            }
        }
        ticker.next().await;
    }
}

/// Heartbeat task - blinks LED to show system is running
#[embassy_executor::task]
async fn heartbeat_task(mut led: Output<'static>) {
    loop {
        led.set_high();
        Timer::after(Duration::from_millis(100)).await;
        led.set_low();
        Timer::after(Duration::from_millis(900)).await;
    }
}
