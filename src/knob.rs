//! Knob input handling
//!
//! Turns decoded encoder steps and switch edges into the control codes
//! the desktop host understands.
//!
//! | Gesture                   | Code                        |
//! |---------------------------|-----------------------------|
//! | turn clockwise            | `VolumeUp`                  |
//! | turn counter-clockwise    | `VolumeDown`                |
//! | hold switch and turn      | `NextSession` / `PreviousSession` |
//! | click (press and release) | `MuteToggle`                |

use crate::drivers::button::{ButtonEdge, PushButton};
use crate::drivers::encoder::QuadratureDecoder;
use crate::hal::gpio::LineIo;
use crate::types::{Channel, ControlCode, Step};

/// Encoder plus push switch, polled as one input device
#[derive(Clone, Debug)]
pub struct Knob<L> {
    decoder: QuadratureDecoder<L>,
    button: PushButton<L>,
    /// A step arrived while the switch was held; the release is not a click
    turned_while_held: bool,
}

impl<L: Copy> Knob<L> {
    /// Create a knob from its CLK, DT and SW lines
    #[must_use]
    pub const fn new(clk: L, dt: L, sw: L) -> Self {
        Self {
            decoder: QuadratureDecoder::new(clk, dt),
            button: PushButton::new(sw),
            turned_while_held: false,
        }
    }

    /// Configure all three lines
    ///
    /// `pull_up` applies to the encoder lines; the switch is always pulled up.
    pub fn begin<IO>(&mut self, io: &mut IO, pull_up: bool)
    where
        IO: LineIo<Line = L>,
    {
        self.decoder.begin(io, pull_up);
        self.button.begin(io);
    }

    /// Sample the lines once; returns at most one control code
    pub fn poll<IO>(&mut self, io: &mut IO) -> Option<ControlCode>
    where
        IO: LineIo<Line = L>,
    {
        let held = self.button.is_pressed();
        let step = self.decoder.read(io);
        let turned = self.on_step(step, held);
        let clicked = self.button.update(io).and_then(|edge| self.on_edge(edge));

        // A release on the polling pass that turned is never a click
        turned.or(clicked)
    }

    fn on_step(&mut self, step: Step, held: bool) -> Option<ControlCode> {
        let code = match (step, held) {
            (Step::NoStep, _) => return None,
            (Step::Clockwise, false) => ControlCode::VolumeUp,
            (Step::Counterclockwise, false) => ControlCode::VolumeDown,
            (Step::Clockwise, true) => ControlCode::NextSession,
            (Step::Counterclockwise, true) => ControlCode::PreviousSession,
        };
        if held {
            self.turned_while_held = true;
        }
        Some(code)
    }

    fn on_edge(&mut self, edge: ButtonEdge) -> Option<ControlCode> {
        match edge {
            ButtonEdge::Pressed => {
                self.turned_while_held = false;
                None
            }
            ButtonEdge::Released => {
                let turned = core::mem::take(&mut self.turned_while_held);
                (!turned).then_some(ControlCode::MuteToggle)
            }
        }
    }

    /// Net detents since start or the last reset
    #[must_use]
    pub const fn position(&self) -> i32 {
        self.decoder.count()
    }

    /// Re-synchronize the detent counter
    pub fn reset(&mut self, value: i32) {
        self.decoder.reset(value);
    }

    /// Underlying decoder
    #[must_use]
    pub const fn decoder(&self) -> &QuadratureDecoder<L> {
        &self.decoder
    }

    /// Whether the switch is currently held
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.button.is_pressed()
    }
}

impl Knob<Channel> {
    /// Knob on the standard encoder module lines
    #[must_use]
    pub const fn on_module() -> Self {
        Self::new(Channel::Clk, Channel::Dt, Channel::Sw)
    }
}

impl Default for Knob<Channel> {
    fn default() -> Self {
        Self::on_module()
    }
}
