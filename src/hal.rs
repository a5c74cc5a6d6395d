//! Hardware Abstraction Layer
//!
//! Isolates pin access behind the [`gpio::LineIo`] seam so the decoding
//! logic runs unchanged on the STM32 target and on the host.

pub mod gpio;
