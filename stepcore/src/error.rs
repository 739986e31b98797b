use core::fmt;

/// Everything that can go wrong while building or tuning a stepper.
///
/// Configuration errors are returned by the constructors and prevent the
/// instance from existing at all. `InvalidSpeed` only comes out of the pure
/// rate functions in [`crate::common::rate`]; the sequencer swallows it and
/// parks the motor instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperError {
    /// No wiring mode uses this many pins.
    InvalidPinCount(usize),
    /// Only 2, 4 and 8 microsteps per step have a table.
    UnsupportedMicrostep(u8),
    ZeroStepsPerRevolution,
    /// Non-positive speed, or a conversion that would divide by zero.
    InvalidSpeed,
}

impl fmt::Display for StepperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepperError::InvalidPinCount(count) => {
                write!(f, "no wiring mode drives {count} pins")
            }
            StepperError::UnsupportedMicrostep(divisor) => {
                write!(f, "unsupported microstep divisor {divisor}, expected 2, 4 or 8")
            }
            StepperError::ZeroStepsPerRevolution => {
                write!(f, "steps per revolution must be greater than zero")
            }
            StepperError::InvalidSpeed => write!(f, "speed must be greater than zero"),
        }
    }
}
