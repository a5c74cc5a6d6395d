//! Peripheral Drivers
//!
//! Input devices on the knob's encoder module, built on the
//! [`crate::hal::gpio::LineIo`] seam.

pub mod button;
pub mod encoder;
