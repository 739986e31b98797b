//! Static coil patterns.
//!
//! Full step tables hold one level per control wire, microstep tables hold
//! the `(coil A, coil B)` magnitude in percent of full current, which is
//! `100 * (sin, cos)` of the electrical angle `(step * n + micro) * 90° / n`.

use embedded_hal::digital::PinState;

use crate::StepperError;

const H: PinState = PinState::High;
const L: PinState = PinState::Low;

/// Pin topology of the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WiringMode {
    /// Bipolar/unipolar motor through an inverting circuit, 2 control pins
    TwoWire,
    /// Three phase switched reluctance motor
    ThreeWire,
    FourWire,
    /// Five phase motor with five control wires
    FivePhase,
}

impl WiringMode {
    pub fn from_pin_count(count: usize) -> Result<Self, StepperError> {
        match count {
            2 => Ok(WiringMode::TwoWire),
            3 => Ok(WiringMode::ThreeWire),
            4 => Ok(WiringMode::FourWire),
            5 => Ok(WiringMode::FivePhase),
            _ => Err(StepperError::InvalidPinCount(count)),
        }
    }
    pub fn pin_count(&self) -> usize {
        match self {
            WiringMode::TwoWire => 2,
            WiringMode::ThreeWire => 3,
            WiringMode::FourWire => 4,
            WiringMode::FivePhase => 5,
        }
    }
    /// Number of rows in the phase table, the step index wraps on it.
    pub fn modulus(&self) -> u32 {
        match self {
            WiringMode::TwoWire => TWO_WIRE.len() as u32,
            WiringMode::ThreeWire => THREE_WIRE.len() as u32,
            WiringMode::FourWire => FOUR_WIRE.len() as u32,
            WiringMode::FivePhase => FIVE_PHASE.len() as u32,
        }
    }
}

// columns C1 and C2 of the four wire table, the circuit inverts them for the other coil ends
static TWO_WIRE: [[PinState; 2]; 4] = [[L, H], [H, H], [H, L], [L, L]];

// A, AB, B, BC, C, CA
static THREE_WIRE: [[PinState; 3]; 6] = [
    [H, L, L],
    [H, H, L],
    [L, H, L],
    [L, H, H],
    [L, L, H],
    [H, L, H],
];

// pins 1-2 are the leads of coil A, 3-4 of coil B
static FOUR_WIRE: [[PinState; 4]; 4] = [
    [H, L, H, L],
    [L, H, H, L],
    [L, H, L, H],
    [H, L, L, H],
];

static FIVE_PHASE: [[PinState; 5]; 10] = [
    [L, H, H, L, H],
    [L, H, L, L, H],
    [L, H, L, H, H],
    [L, H, L, H, L],
    [H, H, L, H, L],
    [H, L, L, H, L],
    [H, L, H, H, L],
    [H, L, H, L, L],
    [H, L, H, L, H],
    [L, L, H, L, H],
];

/// Pin levels for `phase`, one per control wire. `phase` is reduced modulo the table length.
pub fn full_step_row(mode: WiringMode, phase: usize) -> &'static [PinState] {
    match mode {
        WiringMode::TwoWire => &TWO_WIRE[phase % TWO_WIRE.len()],
        WiringMode::ThreeWire => &THREE_WIRE[phase % THREE_WIRE.len()],
        WiringMode::FourWire => &FOUR_WIRE[phase % FOUR_WIRE.len()],
        WiringMode::FivePhase => &FIVE_PHASE[phase % FIVE_PHASE.len()],
    }
}

/// Microsteps per full step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MicrostepDivisor {
    Half,
    Quarter,
    Eighth,
}

impl MicrostepDivisor {
    pub fn per_step(&self) -> u8 {
        match self {
            MicrostepDivisor::Half => 2,
            MicrostepDivisor::Quarter => 4,
            MicrostepDivisor::Eighth => 8,
        }
    }
}

impl TryFrom<u8> for MicrostepDivisor {
    type Error = StepperError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(MicrostepDivisor::Half),
            4 => Ok(MicrostepDivisor::Quarter),
            8 => Ok(MicrostepDivisor::Eighth),
            other => Err(StepperError::UnsupportedMicrostep(other)),
        }
    }
}

/// Signed coil magnitudes, percent of full duty.
pub type CoilPair = (i8, i8);

static HALF_STEP: [[CoilPair; 2]; 4] = [
    [(0, 100), (71, 71)],
    [(100, 0), (71, -71)],
    [(0, -100), (-71, -71)],
    [(-100, 0), (-71, 71)],
];

static QUARTER_STEP: [[CoilPair; 4]; 4] = [
    [(0, 100), (38, 92), (71, 71), (92, 38)],
    [(100, 0), (92, -38), (71, -71), (38, -92)],
    [(0, -100), (-38, -92), (-71, -71), (-92, -38)],
    [(-100, 0), (-92, 38), (-71, 71), (-38, 92)],
];

static EIGHTH_STEP: [[CoilPair; 8]; 4] = [
    [(0, 100), (20, 98), (38, 92), (56, 83), (71, 71), (83, 56), (92, 38), (98, 20)],
    [(100, 0), (98, -20), (92, -38), (83, -56), (71, -71), (56, -83), (38, -92), (20, -98)],
    [(0, -100), (-20, -98), (-38, -92), (-56, -83), (-71, -71), (-83, -56), (-92, -38), (-98, -20)],
    [(-100, 0), (-98, 20), (-92, 38), (-83, 56), (-71, 71), (-56, 83), (-38, 92), (-20, 98)],
];

/// Coil magnitudes for full step `phase` (mod 4) and microstep `micro` (mod divisor).
pub fn coil_magnitudes(divisor: MicrostepDivisor, phase: usize, micro: usize) -> CoilPair {
    let phase = phase % 4;
    match divisor {
        MicrostepDivisor::Half => HALF_STEP[phase][micro % 2],
        MicrostepDivisor::Quarter => QUARTER_STEP[phase][micro % 4],
        MicrostepDivisor::Eighth => EIGHTH_STEP[phase][micro % 8],
    }
}

#[cfg(all(feature = "std", test))]
mod tests {
    extern crate std;
    use core::f32::consts::PI;

    use defmt_or_log::trace;
    use test_log::test;

    use super::*;

    #[test]
    fn modulus_follows_wiring() {
        assert_eq!(WiringMode::TwoWire.modulus(), 4);
        assert_eq!(WiringMode::ThreeWire.modulus(), 6);
        assert_eq!(WiringMode::FourWire.modulus(), 4);
        assert_eq!(WiringMode::FivePhase.modulus(), 10);
    }

    #[test]
    fn pin_count_round_trips() {
        for count in 2..=5 {
            assert_eq!(WiringMode::from_pin_count(count).unwrap().pin_count(), count);
        }
        assert_eq!(WiringMode::from_pin_count(1), Err(StepperError::InvalidPinCount(1)));
        assert_eq!(WiringMode::from_pin_count(6), Err(StepperError::InvalidPinCount(6)));
    }

    #[test]
    fn rows_have_one_level_per_wire() {
        for mode in [
            WiringMode::TwoWire,
            WiringMode::ThreeWire,
            WiringMode::FourWire,
            WiringMode::FivePhase,
        ] {
            for phase in 0..mode.modulus() as usize {
                assert_eq!(full_step_row(mode, phase).len(), mode.pin_count());
            }
        }
    }

    #[test]
    fn four_wire_never_shorts_a_coil() {
        for phase in 0..4 {
            let row = full_step_row(WiringMode::FourWire, phase);
            assert_ne!(row[0], row[1], "coil A shorted at phase {}", phase);
            assert_ne!(row[2], row[3], "coil B shorted at phase {}", phase);
        }
    }

    #[test]
    fn row_lookup_wraps() {
        assert_eq!(
            full_step_row(WiringMode::FivePhase, 10),
            full_step_row(WiringMode::FivePhase, 0)
        );
        assert_eq!(full_step_row(WiringMode::TwoWire, 5), &[H, H]);
    }

    #[test]
    fn only_three_divisors() {
        assert_eq!(MicrostepDivisor::try_from(4), Ok(MicrostepDivisor::Quarter));
        assert_eq!(
            MicrostepDivisor::try_from(16),
            Err(StepperError::UnsupportedMicrostep(16))
        );
        assert_eq!(
            MicrostepDivisor::try_from(1),
            Err(StepperError::UnsupportedMicrostep(1))
        );
    }

    #[test]
    fn quarter_step_sequence() {
        let seq: std::vec::Vec<CoilPair> = (0..4)
            .map(|m| coil_magnitudes(MicrostepDivisor::Quarter, 0, m))
            .collect();
        assert_eq!(seq, [(0, 100), (38, 92), (71, 71), (92, 38)]);
    }

    #[test]
    fn tables_follow_sin_cos() {
        for divisor in [
            MicrostepDivisor::Half,
            MicrostepDivisor::Quarter,
            MicrostepDivisor::Eighth,
        ] {
            let n = divisor.per_step() as usize;
            for phase in 0..4 {
                for micro in 0..n {
                    let angle = (phase * n + micro) as f32 * PI / 2.0 / n as f32;
                    let (a, b) = coil_magnitudes(divisor, phase, micro);
                    let expected_a = (angle.sin() * 100.0).round() as i32;
                    let expected_b = (angle.cos() * 100.0).round() as i32;
                    trace!("{} {} {}: {} {}", n, phase, micro, a, b);
                    assert!((a as i32 - expected_a).abs() <= 1);
                    assert!((b as i32 - expected_b).abs() <= 1);
                }
            }
        }
    }
}
