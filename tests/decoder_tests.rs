//! Quadrature Decoder Tests
//!
//! Tests for the table-driven decoder, its line adapters and the shared wrapper.
//! Run with: cargo test --features std --test decoder_tests

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin};
use volume_knob::drivers::encoder::{transition, QuadratureDecoder, SharedDecoder, State};
use volume_knob::hal::gpio::{LineIo, PinLines};
use volume_knob::types::{Channel, InputMode, SignalPattern, Step};

const CW_DETENT: [u8; 4] = [2, 3, 1, 0];
const CCW_DETENT: [u8; 4] = [1, 3, 2, 0];

/// Electrical levels of a pulled-up module, which rests at 3
const PULLED_UP_CW_DETENT: [u8; 4] = [1, 0, 2, 3];
const PULLED_UP_CCW_DETENT: [u8; 4] = [2, 0, 1, 3];

fn pattern(bits: u8) -> SignalPattern {
    SignalPattern::try_from(bits).unwrap()
}

fn feed(decoder: &mut QuadratureDecoder<Channel>, patterns: &[u8]) -> Vec<Step> {
    patterns.iter().map(|&bits| decoder.update(pattern(bits))).collect()
}

fn decoder() -> QuadratureDecoder<Channel> {
    QuadratureDecoder::new(Channel::Clk, Channel::Dt)
}

/// Scripted encoder lines
#[derive(Default)]
struct FakeLines {
    clk: bool,
    dt: bool,
    configured: Vec<(Channel, InputMode)>,
    reads: usize,
}

impl FakeLines {
    fn set(&mut self, bits: u8) {
        let sample = pattern(bits);
        self.clk = sample.first();
        self.dt = sample.second();
    }
}

impl LineIo for FakeLines {
    type Line = Channel;

    fn configure(&mut self, line: Channel, mode: InputMode) {
        self.configured.push((line, mode));
    }

    fn is_high(&mut self, line: Channel) -> bool {
        self.reads += 1;
        match line {
            Channel::Clk => self.clk,
            Channel::Dt => self.dt,
            Channel::Sw => true,
        }
    }
}

// =============================================================================
// Full Detent Tests
// =============================================================================

#[test]
fn fresh_decoder_is_idle() {
    let decoder = decoder();
    assert_eq!(decoder.state(), State::Start);
    assert_eq!(decoder.count(), 0);
}

#[test]
fn clockwise_detent_emits_one_step() {
    let mut decoder = decoder();

    let steps = feed(&mut decoder, &CW_DETENT);

    assert_eq!(
        steps,
        [Step::NoStep, Step::NoStep, Step::NoStep, Step::Clockwise]
    );
    assert_eq!(decoder.count(), 1);
    assert_eq!(decoder.state(), State::Start);
}

#[test]
fn counterclockwise_detent_emits_one_step() {
    let mut decoder = decoder();

    let steps = feed(&mut decoder, &CCW_DETENT);

    assert_eq!(
        steps,
        [Step::NoStep, Step::NoStep, Step::NoStep, Step::Counterclockwise]
    );
    assert_eq!(decoder.count(), -1);
    assert_eq!(decoder.state(), State::Start);
}

#[test]
fn clockwise_walks_through_named_states() {
    let mut decoder = decoder();
    let expected = [
        State::ClockwiseBegin,
        State::ClockwiseNext,
        State::ClockwiseFinal,
        State::Start,
    ];

    for (bits, state) in CW_DETENT.iter().zip(expected) {
        decoder.update(pattern(*bits));
        assert_eq!(decoder.state(), state);
    }
}

#[test]
fn counterclockwise_walks_through_named_states() {
    let mut decoder = decoder();
    let expected = [
        State::CounterclockwiseBegin,
        State::CounterclockwiseNext,
        State::CounterclockwiseFinal,
        State::Start,
    ];

    for (bits, state) in CCW_DETENT.iter().zip(expected) {
        decoder.update(pattern(*bits));
        assert_eq!(decoder.state(), state);
    }
}

#[test]
fn rotations_cancel_out() {
    let mut decoder = decoder();
    decoder.reset(17);

    for _ in 0..25 {
        feed(&mut decoder, &CW_DETENT);
    }
    assert_eq!(decoder.count(), 42);

    for _ in 0..25 {
        feed(&mut decoder, &CCW_DETENT);
    }
    assert_eq!(decoder.count(), 17);
    assert_eq!(decoder.state(), State::Start);
}

#[test]
fn direction_change_between_detents() {
    let mut decoder = decoder();

    assert_eq!(feed(&mut decoder, &CW_DETENT)[3], Step::Clockwise);
    assert_eq!(feed(&mut decoder, &CCW_DETENT)[3], Step::Counterclockwise);
    assert_eq!(feed(&mut decoder, &CW_DETENT)[3], Step::Clockwise);
    assert_eq!(decoder.count(), 1);
}

// =============================================================================
// Bounce Tests
// =============================================================================

#[test]
fn repeated_samples_never_step() {
    let mut decoder = decoder();

    for bits in CW_DETENT {
        let first = decoder.update(pattern(bits));
        let count = decoder.count();
        let state = decoder.state();
        for _ in 0..5 {
            assert_eq!(decoder.update(pattern(bits)), Step::NoStep);
            assert_eq!(decoder.count(), count);
            assert_eq!(decoder.state(), state);
        }
        if bits == 0 {
            assert_eq!(first, Step::Clockwise);
        }
    }
    assert_eq!(decoder.count(), 1);
}

#[test]
fn idle_samples_never_step() {
    let mut decoder = decoder();
    for _ in 0..100 {
        assert_eq!(decoder.update(SignalPattern::IDLE), Step::NoStep);
    }
    assert_eq!(decoder.count(), 0);
}

#[test]
fn begin_then_idle_is_discarded() {
    for first in [1, 2] {
        let mut decoder = decoder();
        assert_eq!(feed(&mut decoder, &[first, 0]), [Step::NoStep, Step::NoStep]);
        assert_eq!(decoder.state(), State::Start);
        assert_eq!(decoder.count(), 0);
    }
}

#[test]
fn partial_turn_then_idle_is_discarded() {
    let mut decoder = decoder();
    feed(&mut decoder, &[2, 3, 0]);
    assert_eq!(decoder.state(), State::Start);

    feed(&mut decoder, &[1, 3, 0]);
    assert_eq!(decoder.state(), State::Start);
    assert_eq!(decoder.count(), 0);
}

#[test]
fn chatter_inside_a_detent_still_counts_once() {
    let mut decoder = decoder();

    let steps = feed(&mut decoder, &[2, 3, 2, 3, 1, 3, 1, 0]);

    assert_eq!(steps.iter().filter(|s| s.is_step()).count(), 1);
    assert_eq!(steps.last(), Some(&Step::Clockwise));
    assert_eq!(decoder.count(), 1);
}

#[test]
fn illegal_jump_falls_back_to_start() {
    // 10 -> 01 skips the both-active phase
    assert_eq!(transition(State::ClockwiseBegin, pattern(1)).next, State::Start);
    assert_eq!(
        transition(State::CounterclockwiseBegin, pattern(2)).next,
        State::Start
    );
}

#[test]
fn steps_sum_to_counter_for_every_short_sequence() {
    // All 4^6 sequences of six samples
    for code in 0..4u32.pow(6) {
        let patterns: Vec<u8> = (0..6).map(|i| ((code >> (2 * i)) & 0b11) as u8).collect();
        let mut decoder = decoder();

        let total: i32 = feed(&mut decoder, &patterns).iter().map(|s| s.delta()).sum();

        assert_eq!(decoder.count(), total, "sequence {patterns:?}");
        assert!(total.abs() <= 1, "sequence {patterns:?} counted {total}");
    }
}

// =============================================================================
// Reset and Counter Tests
// =============================================================================

#[test]
fn reset_sets_counter_exactly() {
    let mut decoder = decoder();
    feed(&mut decoder, &CW_DETENT);

    decoder.reset(-300);
    assert_eq!(decoder.count(), -300);
    assert_eq!(decoder.state(), State::Start);

    decoder.reset_default();
    assert_eq!(decoder.count(), 0);
}

#[test]
fn reset_mid_turn_behaves_like_fresh() {
    for code in 0..4u32.pow(5) {
        let patterns: Vec<u8> = (0..5).map(|i| ((code >> (2 * i)) & 0b11) as u8).collect();

        let mut used = decoder();
        feed(&mut used, &[2, 3, 1]);
        used.reset(0);
        let mut fresh = decoder();

        assert_eq!(feed(&mut used, &patterns), feed(&mut fresh, &patterns));
        assert_eq!(used.state(), fresh.state());
    }
}

#[test]
fn counter_wraps_at_limits() {
    let mut decoder = decoder();

    decoder.reset(i32::MAX);
    feed(&mut decoder, &CW_DETENT);
    assert_eq!(decoder.count(), i32::MIN);

    feed(&mut decoder, &CCW_DETENT);
    assert_eq!(decoder.count(), i32::MAX);
}

// =============================================================================
// Line I/O Tests
// =============================================================================

#[test]
fn construction_performs_no_io() {
    let lines = FakeLines::default();
    let _decoder = decoder();
    assert!(lines.configured.is_empty());
    assert_eq!(lines.reads, 0);
}

#[test]
fn begin_configures_both_lines() {
    let mut lines = FakeLines::default();
    let mut decoder = decoder();
    assert!(!decoder.is_active_low());

    decoder.begin_default(&mut lines);
    assert_eq!(
        lines.configured,
        [(Channel::Clk, InputMode::PullUp), (Channel::Dt, InputMode::PullUp)]
    );
    assert!(decoder.is_active_low());

    lines.configured.clear();
    decoder.begin(&mut lines, false);
    assert_eq!(
        lines.configured,
        [(Channel::Clk, InputMode::Floating), (Channel::Dt, InputMode::Floating)]
    );
    assert!(!decoder.is_active_low());
    assert_eq!(decoder.state(), State::Start);
}

#[test]
fn read_packs_first_line_into_high_bit() {
    let mut lines = FakeLines {
        clk: true,
        dt: false,
        ..FakeLines::default()
    };
    let mut decoder = decoder();

    assert_eq!(decoder.read(&mut lines), Step::NoStep);
    assert_eq!(decoder.state(), State::ClockwiseBegin);
    assert_eq!(lines.reads, 2);
}

fn read_levels(
    decoder: &mut QuadratureDecoder<Channel>,
    lines: &mut FakeLines,
    levels: &[u8],
) -> Vec<Step> {
    levels
        .iter()
        .map(|&bits| {
            lines.set(bits);
            decoder.read(lines)
        })
        .collect()
}

#[test]
fn floating_lines_decode_idle_low_detents() {
    let mut lines = FakeLines::default();
    let mut decoder = decoder();
    decoder.begin(&mut lines, false);

    assert_eq!(
        read_levels(&mut decoder, &mut lines, &CW_DETENT),
        [Step::NoStep, Step::NoStep, Step::NoStep, Step::Clockwise]
    );
    assert_eq!(decoder.count(), 1);
}

#[test]
fn pulled_up_lines_decode_idle_high_detents() {
    let mut lines = FakeLines::default();
    lines.set(3);
    let mut decoder = decoder();
    decoder.begin_default(&mut lines);

    for _ in 0..20 {
        assert_eq!(decoder.read(&mut lines), Step::NoStep);
    }
    assert_eq!(decoder.state(), State::Start);

    assert_eq!(
        read_levels(&mut decoder, &mut lines, &PULLED_UP_CW_DETENT),
        [Step::NoStep, Step::NoStep, Step::NoStep, Step::Clockwise]
    );
    assert_eq!(
        read_levels(&mut decoder, &mut lines, &PULLED_UP_CCW_DETENT),
        [Step::NoStep, Step::NoStep, Step::NoStep, Step::Counterclockwise]
    );
    assert_eq!(decoder.count(), 0);
    assert_eq!(decoder.state(), State::Start);
}

#[test]
fn decoder_reports_its_lines() {
    let decoder = QuadratureDecoder::new(7u8, 9u8);
    assert_eq!(decoder.lines(), (7, 9));
}

/// `embedded-hal` pin driven from the test
#[derive(Clone, Default)]
struct TestPin(Rc<Cell<bool>>);

impl ErrorType for TestPin {
    type Error = Infallible;
}

impl InputPin for TestPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

/// Set both pins through each level and keep only completed detents
fn drive(
    decoder: &mut QuadratureDecoder<Channel>,
    lines: &mut PinLines<TestPin, TestPin, TestPin>,
    clk: &TestPin,
    dt: &TestPin,
    levels: &[u8],
) -> Vec<Step> {
    levels
        .iter()
        .map(|&bits| {
            let sample = pattern(bits);
            clk.0.set(sample.first());
            dt.0.set(sample.second());
            decoder.read(lines)
        })
        .filter(|step| step.is_step())
        .collect()
}

#[test]
fn pin_lines_decode_idle_high_pins_through_embedded_hal() {
    // Pull-ups hold every pin high at rest
    let clk = TestPin(Rc::new(Cell::new(true)));
    let dt = TestPin(Rc::new(Cell::new(true)));
    let sw = TestPin(Rc::new(Cell::new(true)));
    let mut lines = PinLines::new(clk.clone(), dt.clone(), sw);
    let mut decoder = decoder();

    decoder.begin_default(&mut lines);
    assert_eq!(lines.mode(), Some(InputMode::PullUp));
    assert_eq!(decoder.read(&mut lines), Step::NoStep);

    assert_eq!(
        drive(&mut decoder, &mut lines, &clk, &dt, &PULLED_UP_CW_DETENT),
        [Step::Clockwise]
    );
    assert_eq!(
        drive(&mut decoder, &mut lines, &clk, &dt, &PULLED_UP_CW_DETENT),
        [Step::Clockwise]
    );
    assert_eq!(decoder.count(), 2);

    // Reverse direction
    assert_eq!(
        drive(&mut decoder, &mut lines, &clk, &dt, &PULLED_UP_CCW_DETENT),
        [Step::Counterclockwise]
    );
    assert_eq!(
        drive(&mut decoder, &mut lines, &clk, &dt, &PULLED_UP_CCW_DETENT),
        [Step::Counterclockwise]
    );
    assert_eq!(
        drive(&mut decoder, &mut lines, &clk, &dt, &PULLED_UP_CCW_DETENT),
        [Step::Counterclockwise]
    );
    assert_eq!(decoder.count(), -1);
    assert!(lines.is_high(Channel::Sw));
}

#[test]
fn pin_lines_decode_idle_low_pins_when_floating() {
    let clk = TestPin::default();
    let dt = TestPin::default();
    let sw = TestPin(Rc::new(Cell::new(true)));
    let mut lines = PinLines::new(clk.clone(), dt.clone(), sw);
    let mut decoder = decoder();

    decoder.begin(&mut lines, false);
    assert_eq!(lines.mode(), Some(InputMode::Floating));

    assert_eq!(
        drive(&mut decoder, &mut lines, &clk, &dt, &CCW_DETENT),
        [Step::Counterclockwise]
    );
    assert_eq!(decoder.count(), -1);
}

// =============================================================================
// Shared Decoder Tests
// =============================================================================

#[test]
fn shared_decoder_counts_across_contexts() {
    static SHARED: SharedDecoder<Channel> =
        SharedDecoder::new(QuadratureDecoder::new(Channel::Clk, Channel::Dt));

    let worker = std::thread::spawn(|| {
        for _ in 0..10 {
            for bits in CW_DETENT {
                SHARED.update(pattern(bits));
            }
        }
    });
    worker.join().unwrap();

    assert_eq!(SHARED.count(), 10);

    let mut lines = FakeLines::default();
    lines.set(2);
    assert_eq!(SHARED.read(&mut lines), Step::NoStep);

    SHARED.reset(3);
    assert_eq!(SHARED.count(), 3);
}
