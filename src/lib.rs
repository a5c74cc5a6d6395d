//! Volume Knob Firmware Library
//!
//! Core functionality for a USB volume knob built around a KY-040 style
//! mechanical rotary encoder. Turning the knob adjusts the volume of the
//! selected audio session on the desktop, clicking it toggles mute, and
//! turning while held switches sessions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │        Knob gestures  │  Host line protocol                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      DRIVER LAYER                            │
//! │  Quadrature decoder (state table)  │  Debounced switch       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / TRANSPORT LAYER                      │
//! │        LineIo (GPIO)  │  USB CDC ACM                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                          │
//! │           embassy-rs (async/await executor)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Type-driven design**: decoder states and outcomes are enums, so an
//!   invalid table row cannot be expressed
//! - **No unsafe in application code**: all unsafe isolated in HAL crates
//! - **Functional core, imperative shell**: decoding is pure, pin access
//!   sits behind [`hal::gpio::LineIo`]
//! - **No silent failures**: reply encoding returns `Result`, unknown host
//!   lines parse to `None`, and the USB link logs any reply it has to skip
//!   while endpoint errors end the session

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;
#[cfg(feature = "embedded")]
pub use embassy_usb;

/// Hardware Abstraction Layer
///
/// Line access seam plus STM32 and `embedded-hal` adapters.
pub mod hal;

/// Peripheral Drivers
///
/// Quadrature decoder and push switch.
pub mod drivers;

/// Knob gestures
///
/// Maps decoded input to host control codes.
pub mod knob;

/// USB Subsystem
///
/// CDC ACM transport for the host link.
#[cfg(feature = "embedded")]
pub mod usb;

/// Communication Protocols
///
/// Handshake and control-code line protocol.
pub mod protocol;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    pub use crate::drivers::button::{ButtonEdge, ButtonState, PushButton};
    pub use crate::drivers::encoder::{QuadratureDecoder, SharedDecoder, State};
    pub use crate::hal::gpio::LineIo;
    pub use crate::knob::Knob;
    pub use crate::protocol::{HostLink, HostMessage, Reply};

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
