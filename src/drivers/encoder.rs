//! Rotary Encoder Driver
//!
//! Table-driven quadrature decoder for mechanical encoders with one full
//! quadrature cycle per detent. Contact bounce only ever walks the state
//! machine back toward [`State::Start`], so no timers are needed.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::hal::gpio::LineIo;
use crate::types::{InputMode, SignalPattern, Step};

/// Decoder state machine states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
    /// Both lines idle, no detent in progress
    #[default]
    Start,
    /// First clockwise edge seen
    ClockwiseBegin,
    /// Both lines active on a clockwise turn
    ClockwiseNext,
    /// Last clockwise edge seen, waiting for idle
    ClockwiseFinal,
    /// First counter-clockwise edge seen
    CounterclockwiseBegin,
    /// Both lines active on a counter-clockwise turn
    CounterclockwiseNext,
    /// Last counter-clockwise edge seen, waiting for idle
    CounterclockwiseFinal,
}

impl State {
    /// Row index into the transition table
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for State {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Start => defmt::write!(f, "Start"),
            Self::ClockwiseBegin => defmt::write!(f, "CwBegin"),
            Self::ClockwiseNext => defmt::write!(f, "CwNext"),
            Self::ClockwiseFinal => defmt::write!(f, "CwFinal"),
            Self::CounterclockwiseBegin => defmt::write!(f, "CcwBegin"),
            Self::CounterclockwiseNext => defmt::write!(f, "CcwNext"),
            Self::CounterclockwiseFinal => defmt::write!(f, "CcwFinal"),
        }
    }
}

/// One table entry: where to go and what the move completed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// State after the move
    pub next: State,
    /// Step emitted by the move
    pub step: Step,
}

impl Transition {
    const fn to(next: State) -> Self {
        Self {
            next,
            step: Step::NoStep,
        }
    }

    const fn emit(step: Step) -> Self {
        Self {
            next: State::Start,
            step,
        }
    }
}

/// Transition table, rows by [`State`], columns by [`SignalPattern`]
///
/// Clockwise detent: `10 -> 11 -> 01 -> 00`.
/// Counter-clockwise detent: `01 -> 11 -> 10 -> 00`.
pub const TRANSITIONS: [[Transition; 4]; 7] = {
    use State::{
        ClockwiseBegin as CwBegin, ClockwiseFinal as CwFinal, ClockwiseNext as CwNext,
        CounterclockwiseBegin as CcwBegin, CounterclockwiseFinal as CcwFinal,
        CounterclockwiseNext as CcwNext, Start,
    };
    const fn t(next: State) -> Transition {
        Transition::to(next)
    }

    [
        // Start
        [t(Start), t(CcwBegin), t(CwBegin), t(Start)],
        // ClockwiseBegin
        [t(Start), t(Start), t(CwBegin), t(CwNext)],
        // ClockwiseNext
        [t(Start), t(CwFinal), t(CwBegin), t(CwNext)],
        // ClockwiseFinal
        [Transition::emit(Step::Clockwise), t(CwFinal), t(Start), t(CwNext)],
        // CounterclockwiseBegin
        [t(Start), t(CcwBegin), t(Start), t(CcwNext)],
        // CounterclockwiseNext
        [t(Start), t(CcwBegin), t(CcwFinal), t(CcwNext)],
        // CounterclockwiseFinal
        [Transition::emit(Step::Counterclockwise), t(Start), t(CcwFinal), t(CcwNext)],
    ]
};

/// Look up the move for a state and a fresh sample
#[must_use]
pub const fn transition(state: State, pattern: SignalPattern) -> Transition {
    TRANSITIONS[state.index()][pattern.index()]
}

/// Quadrature decoder bound to two input lines
///
/// Holds only the machine state, a detent counter and the line polarity;
/// the lines are handles into whatever [`LineIo`] the caller passes to
/// each call.
///
/// The table expects a resting pattern of `0`. Lines begun with pull-ups
/// rest high and are switched to ground by the encoder, so those are
/// sampled active-low.
#[derive(Clone, Debug)]
pub struct QuadratureDecoder<L> {
    first: L,
    second: L,
    active_low: bool,
    state: State,
    counter: i32,
}

impl<L: Copy> QuadratureDecoder<L> {
    /// Create a decoder for the given first (CLK) and second (DT) lines
    #[must_use]
    pub const fn new(first: L, second: L) -> Self {
        Self {
            first,
            second,
            active_low: false,
            state: State::Start,
            counter: 0,
        }
    }

    /// Configure both lines as inputs, optionally with internal pull-ups
    ///
    /// With pull-ups the lines idle high, so later reads treat a low line
    /// as active. State and counter are left untouched.
    pub fn begin<IO>(&mut self, io: &mut IO, pull_up: bool)
    where
        IO: LineIo<Line = L>,
    {
        let mode = InputMode::from_pull_up(pull_up);
        io.configure(self.first, mode);
        io.configure(self.second, mode);
        self.active_low = pull_up;
    }

    /// [`QuadratureDecoder::begin`] with pull-ups enabled
    pub fn begin_default<IO>(&mut self, io: &mut IO)
    where
        IO: LineIo<Line = L>,
    {
        self.begin(io, true);
    }

    /// Sample both lines and advance the state machine
    pub fn read<IO>(&mut self, io: &mut IO) -> Step
    where
        IO: LineIo<Line = L>,
    {
        let first = io.is_high(self.first) != self.active_low;
        let second = io.is_high(self.second) != self.active_low;
        self.update(SignalPattern::from_levels(first, second))
    }

    /// Whether a low line reads as active, set by the last `begin`
    #[must_use]
    pub const fn is_active_low(&self) -> bool {
        self.active_low
    }

    /// Line handles this decoder samples, first then second
    #[must_use]
    pub fn lines(&self) -> (L, L) {
        (self.first, self.second)
    }
}

impl<L> QuadratureDecoder<L> {
    /// Advance the state machine with an already sampled pattern
    pub fn update(&mut self, pattern: SignalPattern) -> Step {
        let Transition { next, step } = transition(self.state, pattern);
        self.state = next;
        self.counter = self.counter.wrapping_add(step.delta());

        #[cfg(feature = "embedded")]
        if step.is_step() {
            defmt::trace!("encoder {} -> {}", step, self.counter);
        }

        step
    }

    /// Detents counted since creation or the last reset, wrapping on overflow
    #[must_use]
    pub const fn count(&self) -> i32 {
        self.counter
    }

    /// Current state machine position
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Set the counter and return the machine to [`State::Start`]
    pub fn reset(&mut self, value: i32) {
        self.counter = value;
        self.state = State::Start;
    }

    /// [`QuadratureDecoder::reset`] to zero
    pub fn reset_default(&mut self) {
        self.reset(0);
    }
}

/// Decoder shared between an interrupt handler and the main loop
///
/// Every access runs inside a critical section.
pub struct SharedDecoder<L> {
    inner: Mutex<RefCell<QuadratureDecoder<L>>>,
}

impl<L: Copy> SharedDecoder<L> {
    /// Wrap a decoder for cross-context use
    #[must_use]
    pub const fn new(decoder: QuadratureDecoder<L>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(decoder)),
        }
    }

    /// Poll the lines under a critical section
    pub fn read<IO>(&self, io: &mut IO) -> Step
    where
        IO: LineIo<Line = L>,
    {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).read(io))
    }

    /// Feed a sampled pattern under a critical section
    pub fn update(&self, pattern: SignalPattern) -> Step {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).update(pattern))
    }

    /// Current counter value
    #[must_use]
    pub fn count(&self) -> i32 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).count())
    }

    /// Set the counter and return the machine to its idle state
    pub fn reset(&self, value: i32) {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).reset(value));
    }
}
