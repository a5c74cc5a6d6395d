//! USB CDC ACM (Serial) Implementation
//!
//! Virtual serial port carrying the host line protocol.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_usb::class::cdc_acm::CdcAcmClass;
use embassy_usb::driver::{Driver, EndpointError};

use crate::config::{
    CONTROL_QUEUE_DEPTH, SERIAL_BAUD_RATE, USB_CDC_PACKET_SIZE, USB_MANUFACTURER, USB_PID,
    USB_PRODUCT, USB_SERIAL, USB_VID,
};
use crate::protocol::{self, HostLink, PacketReplies, Reply};
use crate::types::ControlCode;

/// Queue feeding control codes from the poll loop to the USB writer
pub type ControlReceiver<'ch> =
    Receiver<'ch, CriticalSectionRawMutex, ControlCode, CONTROL_QUEUE_DEPTH>;

/// USB device descriptor strings
pub struct UsbStrings {
    /// Manufacturer name
    pub manufacturer: &'static str,
    /// Product name
    pub product: &'static str,
    /// Serial number
    pub serial: &'static str,
}

impl Default for UsbStrings {
    fn default() -> Self {
        Self {
            manufacturer: USB_MANUFACTURER,
            product: USB_PRODUCT,
            serial: USB_SERIAL,
        }
    }
}

/// USB device info for descriptor
#[derive(Clone, Copy, Debug)]
pub struct UsbDeviceInfo {
    /// Vendor ID
    pub vid: u16,
    /// Product ID
    pub pid: u16,
    /// Device release number
    pub device_release: u16,
}

impl Default for UsbDeviceInfo {
    fn default() -> Self {
        Self {
            vid: USB_VID,
            pid: USB_PID,
            device_release: 0x0100,
        }
    }
}

impl defmt::Format for UsbDeviceInfo {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "USB({:04X}:{:04X})", self.vid, self.pid);
    }
}

/// Build the `embassy-usb` device configuration
#[must_use]
pub fn usb_config(info: UsbDeviceInfo, strings: &UsbStrings) -> embassy_usb::Config<'static> {
    let mut config = embassy_usb::Config::new(info.vid, info.pid);
    config.device_release = info.device_release;
    config.manufacturer = Some(strings.manufacturer);
    config.product = Some(strings.product);
    config.serial_number = Some(strings.serial);
    config.max_power = 100;
    config.max_packet_size_0 = 64;
    config
}

/// Serve the host link forever
///
/// Answers handshakes and pings, and forwards queued control codes while
/// a terminal holds the port open.
pub async fn serve<'d, D: Driver<'d>>(
    class: &mut CdcAcmClass<'d, D>,
    codes: ControlReceiver<'_>,
) -> ! {
    loop {
        class.wait_connection().await;

        // Codes from before the host opened the port are stale
        while codes.try_receive().is_ok() {}

        let coding = class.line_coding();
        if coding.data_rate() != SERIAL_BAUD_RATE {
            defmt::debug!("host opened port at {} baud", coding.data_rate());
        }
        defmt::info!("host connected");

        match run_session(class, &codes).await {
            Ok(()) | Err(EndpointError::Disabled) => defmt::info!("host disconnected"),
            Err(EndpointError::BufferOverflow) => defmt::warn!("USB buffer overflow"),
        }
    }
}

async fn run_session<'d, D: Driver<'d>>(
    class: &mut CdcAcmClass<'d, D>,
    codes: &ControlReceiver<'_>,
) -> Result<(), EndpointError> {
    let mut link = HostLink::new();
    let mut packet = [0u8; USB_CDC_PACKET_SIZE as usize];

    loop {
        match select(class.read_packet(&mut packet), codes.receive()).await {
            Either::First(read) => {
                let len = read?;
                let mut replies = PacketReplies::new();
                let dropped = link.collect_replies(&packet[..len], &mut replies);
                if dropped > 0 {
                    defmt::warn!("dropping {} replies", dropped);
                }
                for reply in replies {
                    send(class, reply).await?;
                }
            }
            Either::Second(code) => send(class, Reply::Control(code)).await?,
        }
    }
}

async fn send<'d, D: Driver<'d>>(
    class: &mut CdcAcmClass<'d, D>,
    reply: Reply,
) -> Result<(), EndpointError> {
    match protocol::encode(reply) {
        Ok(line) => class.write_packet(&line).await,
        Err(err) => {
            defmt::warn!("dropping {}: {}", reply, defmt::Display2Format(&err));
            Ok(())
        }
    }
}
