//! Communication Protocols
//!
//! Line protocol spoken with the desktop volume mixer. Every message is
//! ASCII text terminated by a newline:
//!
//! - host `VOLUME_KNOB_REQUEST` is answered with `VOLUME_KNOB_READY`
//!   while the host scans serial ports for the knob;
//! - control codes travel as decimal numbers (`5` = volume up);
//! - a host `0` (ping) is answered with `1` (pong).

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::config::{
    HANDSHAKE_READY, HANDSHAKE_REQUEST, LINE_BUFFER_SIZE, MAX_REPLIES_PER_PACKET,
    REPLY_BUFFER_SIZE,
};
use crate::types::ControlCode;

/// Encoded outgoing line
pub type ReplyLine = Vec<u8, REPLY_BUFFER_SIZE>;

/// Replies owed for one received USB packet
pub type PacketReplies = Vec<Reply, MAX_REPLIES_PER_PACKET>;

/// Message received from the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostMessage {
    /// Port-scan handshake question
    Handshake,
    /// Numeric control code
    Control(ControlCode),
}

/// Message sent to the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Handshake answer
    Ready,
    /// Numeric control code
    Control(ControlCode),
}

impl Reply {
    /// Reply owed to a host message, if any
    #[must_use]
    pub const fn for_message(message: HostMessage) -> Option<Self> {
        match message {
            HostMessage::Handshake => Some(Self::Ready),
            HostMessage::Control(ControlCode::Ping) => Some(Self::Control(ControlCode::Pong)),
            HostMessage::Control(_) => None,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Reply {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Ready => defmt::write!(f, "Ready"),
            Self::Control(code) => defmt::write!(f, "Control({})", code),
        }
    }
}

/// Protocol failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// Output buffer too small for the line
    Overflow,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow => f.write_str("reply does not fit the output buffer"),
        }
    }
}

/// Incremental parser for host lines
pub struct HostLink {
    /// Current line, terminator excluded
    buffer: Vec<u8, LINE_BUFFER_SIZE>,
    /// The current line outgrew the buffer and will be dropped
    discarding: bool,
}

impl HostLink {
    /// Create an empty parser
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
        }
    }

    /// Feed a byte; returns a message when a line completes
    pub fn feed(&mut self, byte: u8) -> Option<HostMessage> {
        match byte {
            b'\r' | b'\n' => {
                let message = if self.discarding {
                    None
                } else {
                    parse_line(&self.buffer)
                };
                self.buffer.clear();
                self.discarding = false;
                message
            }
            _ if self.discarding => None,
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.discarding = true;
                }
                None
            }
        }
    }

    /// Feed a chunk; invokes `on_message` for every completed line
    pub fn feed_all(&mut self, bytes: &[u8], mut on_message: impl FnMut(HostMessage)) {
        for &byte in bytes {
            if let Some(message) = self.feed(byte) {
                on_message(message);
            }
        }
    }

    /// Feed a chunk and queue the reply owed for each completed line
    ///
    /// Returns how many replies did not fit in `replies`; never more than
    /// zero for a chunk no larger than one USB packet.
    pub fn collect_replies<const N: usize>(
        &mut self,
        bytes: &[u8],
        replies: &mut Vec<Reply, N>,
    ) -> usize {
        let mut dropped = 0;
        self.feed_all(bytes, |message| {
            #[cfg(feature = "embedded")]
            defmt::debug!("host message {}", defmt::Debug2Format(&message));

            if let Some(reply) = Reply::for_message(message) {
                if replies.push(reply).is_err() {
                    dropped += 1;
                }
            }
        });
        dropped
    }

    /// Drop any partial line
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}

impl Default for HostLink {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one complete line; unknown or empty lines yield `None`
#[must_use]
pub fn parse_line(line: &[u8]) -> Option<HostMessage> {
    let text = core::str::from_utf8(line).ok()?.trim();
    if text.is_empty() {
        return None;
    }

    if text.eq_ignore_ascii_case(HANDSHAKE_REQUEST) {
        return Some(HostMessage::Handshake);
    }

    let value: u8 = text.parse().ok()?;
    ControlCode::from_u8(value).map(HostMessage::Control)
}

/// Render a reply as a newline-terminated line
pub fn encode_line(reply: Reply, out: &mut ReplyLine) -> Result<(), ProtocolError> {
    let mut text: String<REPLY_BUFFER_SIZE> = String::new();
    let written = match reply {
        Reply::Ready => writeln!(text, "{HANDSHAKE_READY}"),
        Reply::Control(code) => writeln!(text, "{}", code.as_u8()),
    };
    written.map_err(|_| ProtocolError::Overflow)?;

    out.clear();
    out.extend_from_slice(text.as_bytes())
        .map_err(|()| ProtocolError::Overflow)
}

/// Render a reply into a fresh line buffer
pub fn encode(reply: Reply) -> Result<ReplyLine, ProtocolError> {
    let mut line = ReplyLine::new();
    encode_line(reply, &mut line)?;
    Ok(line)
}
