//! USB Subsystem
//!
//! CDC ACM virtual serial port connecting the knob to the desktop mixer.

pub mod cdc;
