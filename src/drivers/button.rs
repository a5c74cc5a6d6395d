//! Encoder push switch
//!
//! Counter-based debouncing: a new level is accepted once it has been
//! sampled on several consecutive polls.

use crate::config::BUTTON_DEBOUNCE_READS;
use crate::hal::gpio::LineIo;
use crate::types::InputMode;

/// Debounced button state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Button is released
    #[default]
    Released,
    /// Button is pressed
    Pressed,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ButtonState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Released => defmt::write!(f, "Released"),
            Self::Pressed => defmt::write!(f, "Pressed"),
        }
    }
}

/// Debounced change reported by [`PushButton::update`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonEdge {
    /// Released to pressed
    Pressed,
    /// Pressed to released
    Released,
}

/// Active-low push switch with debouncing
#[derive(Clone, Debug)]
pub struct PushButton<L> {
    line: L,
    state: ButtonState,
    last_raw: bool,
    stable_reads: u8,
}

impl<L: Copy> PushButton<L> {
    /// Create a button on the given line, initially released
    #[must_use]
    pub const fn new(line: L) -> Self {
        Self {
            line,
            state: ButtonState::Released,
            last_raw: false,
            stable_reads: 0,
        }
    }

    /// Configure the line as an input with pull-up
    pub fn begin<IO>(&self, io: &mut IO)
    where
        IO: LineIo<Line = L>,
    {
        io.configure(self.line, InputMode::PullUp);
    }

    /// Sample the line; returns an edge when the debounced state changes
    pub fn update<IO>(&mut self, io: &mut IO) -> Option<ButtonEdge>
    where
        IO: LineIo<Line = L>,
    {
        let pressed = io.is_low(self.line);
        self.sample(pressed)
    }

    /// Feed one raw sample (`true` = contact closed)
    pub fn sample(&mut self, pressed: bool) -> Option<ButtonEdge> {
        if pressed == self.last_raw {
            if self.stable_reads < BUTTON_DEBOUNCE_READS {
                self.stable_reads += 1;
            }
        } else {
            self.stable_reads = 0;
            self.last_raw = pressed;
        }

        if self.stable_reads < BUTTON_DEBOUNCE_READS {
            return None;
        }

        let (state, edge) = if pressed {
            (ButtonState::Pressed, ButtonEdge::Pressed)
        } else {
            (ButtonState::Released, ButtonEdge::Released)
        };

        if state == self.state {
            None
        } else {
            self.state = state;
            Some(edge)
        }
    }

    /// Current debounced state
    #[must_use]
    pub const fn state(&self) -> ButtonState {
        self.state
    }

    /// Check if pressed
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        matches!(self.state, ButtonState::Pressed)
    }
}
