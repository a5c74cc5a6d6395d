//! GPIO Abstractions
//!
//! The encoder core never touches pins directly. It talks to a [`LineIo`]
//! implementation, which owns the hardware and hands out levels on demand.

use core::convert::Infallible;

use embedded_hal::digital::InputPin;

use crate::types::{Channel, InputMode};

/// Digital input lines addressed by an opaque identifier
///
/// Implementations own the physical pins. Identifiers are only validated
/// here, never by the decoder.
pub trait LineIo {
    /// Handle naming one input line
    type Line: Copy;

    /// Put a line into input mode with the requested biasing
    fn configure(&mut self, line: Self::Line, mode: InputMode);

    /// Instantaneous electrical level of a line; must not block or have
    /// side effects
    ///
    /// Polarity is the caller's concern: a pulled-up line reports `true`
    /// at rest.
    fn is_high(&mut self, line: Self::Line) -> bool;

    /// Inverse of [`LineIo::is_high`]
    fn is_low(&mut self, line: Self::Line) -> bool {
        !self.is_high(line)
    }
}

impl<T: LineIo + ?Sized> LineIo for &mut T {
    type Line = T::Line;

    fn configure(&mut self, line: Self::Line, mode: InputMode) {
        (**self).configure(line, mode);
    }

    fn is_high(&mut self, line: Self::Line) -> bool {
        (**self).is_high(line)
    }
}

/// Encoder lines backed by `embedded-hal` input pins
///
/// Pins arrive already configured through the HAL's type state, so
/// [`LineIo::configure`] only records the requested mode.
pub struct PinLines<A, B, S> {
    clk: A,
    dt: B,
    sw: S,
    mode: Option<InputMode>,
}

impl<A, B, S> PinLines<A, B, S>
where
    A: InputPin<Error = Infallible>,
    B: InputPin<Error = Infallible>,
    S: InputPin<Error = Infallible>,
{
    /// Wrap the CLK, DT and SW pins of an encoder module
    #[must_use]
    pub fn new(clk: A, dt: B, sw: S) -> Self {
        Self {
            clk,
            dt,
            sw,
            mode: None,
        }
    }

    /// Mode last requested through [`LineIo::configure`]
    #[must_use]
    pub const fn mode(&self) -> Option<InputMode> {
        self.mode
    }

    /// Release the pins
    pub fn release(self) -> (A, B, S) {
        (self.clk, self.dt, self.sw)
    }
}

impl<A, B, S> LineIo for PinLines<A, B, S>
where
    A: InputPin<Error = Infallible>,
    B: InputPin<Error = Infallible>,
    S: InputPin<Error = Infallible>,
{
    type Line = Channel;

    fn configure(&mut self, _line: Channel, mode: InputMode) {
        self.mode = Some(mode);
    }

    fn is_high(&mut self, line: Channel) -> bool {
        let level = match line {
            Channel::Clk => self.clk.is_high(),
            Channel::Dt => self.dt.is_high(),
            Channel::Sw => self.sw.is_high(),
        };
        match level {
            Ok(high) => high,
            Err(never) => match never {},
        }
    }
}

#[cfg(feature = "embedded")]
pub use self::stm32::FlexLines;

#[cfg(feature = "embedded")]
mod stm32 {
    use embassy_stm32::gpio::{Flex, Pull};

    use super::LineIo;
    use crate::types::{Channel, InputMode};

    /// Encoder lines on STM32 flex pins, reconfigurable at runtime
    pub struct FlexLines<'d> {
        clk: Flex<'d>,
        dt: Flex<'d>,
        sw: Flex<'d>,
    }

    impl<'d> FlexLines<'d> {
        /// Take ownership of the CLK, DT and SW pins
        #[must_use]
        pub fn new(clk: Flex<'d>, dt: Flex<'d>, sw: Flex<'d>) -> Self {
            Self { clk, dt, sw }
        }

        fn pin(&mut self, line: Channel) -> &mut Flex<'d> {
            match line {
                Channel::Clk => &mut self.clk,
                Channel::Dt => &mut self.dt,
                Channel::Sw => &mut self.sw,
            }
        }
    }

    impl LineIo for FlexLines<'_> {
        type Line = Channel;

        fn configure(&mut self, line: Channel, mode: InputMode) {
            let pull = match mode {
                InputMode::Floating => Pull::None,
                InputMode::PullUp => Pull::Up,
            };
            defmt::debug!("line {} as input ({})", line, mode);
            self.pin(line).set_as_input(pull);
        }

        fn is_high(&mut self, line: Channel) -> bool {
            self.pin(line).is_high()
        }
    }
}
