//! System configuration and hardware constants
//!
//! Pin mappings, timing, protocol strings and USB identity for the knob
//! are centralized here.

/// Interval between encoder polls in microseconds
///
/// A hand-turned KY-040 produces edges a few milliseconds apart; 1 kHz
/// sampling catches every legal intermediate pattern.
pub const POLL_INTERVAL_US: u64 = 1_000;

/// Consecutive identical samples before a button level is accepted
pub const BUTTON_DEBOUNCE_READS: u8 = 3;

/// Enable internal pull-ups on the encoder lines by default
pub const DEFAULT_PULL_UPS: bool = true;

/// Serial baud rate expected by the desktop host
pub const SERIAL_BAUD_RATE: u32 = 9_600;

/// Longest accepted line from the host, excluding the terminator
pub const LINE_BUFFER_SIZE: usize = 32;

/// Longest line the firmware sends, including the terminator
pub const REPLY_BUFFER_SIZE: usize = 24;

/// Control codes buffered between the poll loop and the USB writer
pub const CONTROL_QUEUE_DEPTH: usize = 16;

/// Handshake question sent by the host while scanning serial ports
pub const HANDSHAKE_REQUEST: &str = "VOLUME_KNOB_REQUEST";

/// Handshake answer identifying this device
pub const HANDSHAKE_READY: &str = "VOLUME_KNOB_READY";

/// USB CDC ACM packet size
pub const USB_CDC_PACKET_SIZE: u16 = 64;

/// Most replies one received packet can owe the host
///
/// The shortest answered line is `0\n`; a line left partial by the
/// previous packet can complete on the first byte.
pub const MAX_REPLIES_PER_PACKET: usize = USB_CDC_PACKET_SIZE as usize / 2;

/// USB VID (pid.codes test VID)
pub const USB_VID: u16 = 0x1209;

/// USB PID (get from pid.codes for production)
pub const USB_PID: u16 = 0x0001;

/// USB manufacturer string
pub const USB_MANUFACTURER: &str = "Volume Knob Project";

/// USB product string
pub const USB_PRODUCT: &str = "Volume Knob";

/// USB serial number string
pub const USB_SERIAL: &str = "0001";

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// Encoder CLK (first channel)
    pub const ENCODER_CLK: &str = "PA0";

    /// Encoder DT (second channel)
    pub const ENCODER_DT: &str = "PA1";

    /// Encoder push switch
    pub const ENCODER_SW: &str = "PA2";

    /// Status LED
    pub const LED_STATUS: &str = "PA5";

    /// USB D+ (handled by USB peripheral)
    pub const USB_DP: &str = "PA12";

    /// USB D- (handled by USB peripheral)
    pub const USB_DM: &str = "PA11";
}
