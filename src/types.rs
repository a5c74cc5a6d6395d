//! Shared types used across the knob firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

/// Outcome of a single decoder poll
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Step {
    /// No complete detent was traversed
    #[default]
    NoStep,
    /// One full clockwise detent
    Clockwise,
    /// One full counter-clockwise detent
    Counterclockwise,
}

impl Step {
    /// Counter adjustment implied by this step
    #[must_use]
    pub const fn delta(self) -> i32 {
        match self {
            Self::NoStep => 0,
            Self::Clockwise => 1,
            Self::Counterclockwise => -1,
        }
    }

    /// Whether a detent was completed
    #[must_use]
    pub const fn is_step(self) -> bool {
        !matches!(self, Self::NoStep)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Step {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::NoStep => defmt::write!(f, "-"),
            Self::Clockwise => defmt::write!(f, "CW"),
            Self::Counterclockwise => defmt::write!(f, "CCW"),
        }
    }
}

/// Electrical configuration for an input line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Plain input, biasing left to external resistors
    Floating,
    /// Input with the internal pull-up enabled
    #[default]
    PullUp,
}

impl InputMode {
    /// Select the mode from a pull-up flag
    #[must_use]
    pub const fn from_pull_up(pull_up: bool) -> Self {
        if pull_up {
            Self::PullUp
        } else {
            Self::Floating
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for InputMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Floating => defmt::write!(f, "floating"),
            Self::PullUp => defmt::write!(f, "pull-up"),
        }
    }
}

/// Physical lines of a KY-040 style encoder module
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// First quadrature channel (A)
    Clk,
    /// Second quadrature channel (B)
    Dt,
    /// Push switch, active low
    Sw,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Channel {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Clk => defmt::write!(f, "CLK"),
            Self::Dt => defmt::write!(f, "DT"),
            Self::Sw => defmt::write!(f, "SW"),
        }
    }
}

/// Two-bit sample of both quadrature lines
///
/// Bit 1 carries the first channel, bit 0 the second.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalPattern(u8);

impl SignalPattern {
    /// Both lines inactive, the detent rest position
    pub const IDLE: Self = Self(0b00);

    /// Pack two line levels, already corrected for polarity
    #[must_use]
    pub const fn from_levels(first: bool, second: bool) -> Self {
        Self(((first as u8) << 1) | second as u8)
    }

    /// Packed value in the range 0..=3
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Column index into the transition table
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Level of the first channel
    #[must_use]
    pub const fn first(self) -> bool {
        self.0 & 0b10 != 0
    }

    /// Level of the second channel
    #[must_use]
    pub const fn second(self) -> bool {
        self.0 & 0b01 != 0
    }
}

impl TryFrom<u8> for SignalPattern {
    type Error = PatternError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        if bits <= 0b11 {
            Ok(Self(bits))
        } else {
            Err(PatternError(bits))
        }
    }
}

impl fmt::Debug for SignalPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignalPattern({:02b})", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SignalPattern {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=u8:b}", self.0);
    }
}

/// A byte that does not fit in two bits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternError(pub u8);

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signal pattern {} out of range 0..=3", self.0)
    }
}

/// Command codes exchanged with the desktop host
///
/// Values match the host application's enumeration and travel as
/// decimal text, one per line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlCode {
    /// Liveness check from the host
    Ping = 0,
    /// Reply to [`ControlCode::Ping`]
    Pong = 1,
    /// Select the previous audio session
    PreviousSession = 2,
    /// Select the next audio session
    NextSession = 3,
    /// Lower the selected session's volume
    VolumeDown = 4,
    /// Raise the selected session's volume
    VolumeUp = 5,
    /// Toggle mute on the selected session
    MuteToggle = 6,
}

impl ControlCode {
    /// Wire value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a wire value
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Ping),
            1 => Some(Self::Pong),
            2 => Some(Self::PreviousSession),
            3 => Some(Self::NextSession),
            4 => Some(Self::VolumeDown),
            5 => Some(Self::VolumeUp),
            6 => Some(Self::MuteToggle),
            _ => None,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ControlCode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Ping => defmt::write!(f, "Ping"),
            Self::Pong => defmt::write!(f, "Pong"),
            Self::PreviousSession => defmt::write!(f, "PrevSession"),
            Self::NextSession => defmt::write!(f, "NextSession"),
            Self::VolumeDown => defmt::write!(f, "VolDown"),
            Self::VolumeUp => defmt::write!(f, "VolUp"),
            Self::MuteToggle => defmt::write!(f, "Mute"),
        }
    }
}
