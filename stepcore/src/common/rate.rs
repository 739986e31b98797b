//! Speed to step interval conversions.
//!
//! All the math is integer and truncating, the resulting timing is quantized to 1µs.
//! An interval that truncates to 0 is as good as a stopped motor.

use crate::StepperError;
use crate::common::phase_table::MicrostepDivisor;

pub const MICROS_PER_SECOND: u32 = 1_000_000;
pub const MICROS_PER_MINUTE: u32 = 60 * MICROS_PER_SECOND;

/// Microseconds between two full steps at `rpm` revolutions per minute.
pub fn interval_from_rpm(steps_per_revolution: u32, rpm: i32) -> Result<u32, StepperError> {
    if rpm <= 0 || steps_per_revolution == 0 {
        return Err(StepperError::InvalidSpeed);
    }
    Ok(MICROS_PER_MINUTE / steps_per_revolution / rpm as u32)
}

/// Microseconds between two full steps at `pps` steps per second.
pub fn interval_from_steps_per_second(pps: i32) -> Result<u32, StepperError> {
    if pps <= 0 {
        return Err(StepperError::InvalidSpeed);
    }
    Ok(MICROS_PER_SECOND / pps as u32)
}

pub fn rpm_to_steps_per_second(steps_per_revolution: u32, rpm: i32) -> i32 {
    (steps_per_revolution as i64 * rpm as i64 / 60) as i32
}

/// Split a step interval between the microsteps of one step.
pub fn microstep_interval(step_interval: u32, divisor: MicrostepDivisor) -> u32 {
    step_interval / divisor.per_step() as u32
}

/// PWM carrier proportional to the microstep rate, `None` when the motor is stopped.
pub fn carrier_hz(microstep_interval: u32, multiplier: u32) -> Option<u32> {
    if microstep_interval == 0 {
        return None;
    }
    Some((MICROS_PER_SECOND / microstep_interval).saturating_mul(multiplier))
}

#[cfg(all(feature = "std", test))]
mod tests {
    extern crate std;
    use test_log::test;

    use super::*;

    #[test]
    fn rpm_interval() {
        assert_eq!(interval_from_rpm(200, 60), Ok(5000));
        assert_eq!(interval_from_rpm(200, 1), Ok(300_000));
        // 60_000_000 / 48 / 7 = 178571.4
        assert_eq!(interval_from_rpm(48, 7), Ok(178_571));
        // too fast to represent, truncates to the disabled interval
        assert_eq!(interval_from_rpm(200, 1_000_000), Ok(0));
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        assert_eq!(interval_from_rpm(200, 0), Err(StepperError::InvalidSpeed));
        assert_eq!(interval_from_rpm(200, -10), Err(StepperError::InvalidSpeed));
        assert_eq!(interval_from_rpm(0, 60), Err(StepperError::InvalidSpeed));
        assert_eq!(interval_from_steps_per_second(0), Err(StepperError::InvalidSpeed));
        assert_eq!(interval_from_steps_per_second(-1), Err(StepperError::InvalidSpeed));
    }

    #[test]
    fn pps_interval() {
        assert_eq!(interval_from_steps_per_second(200), Ok(5000));
        assert_eq!(interval_from_steps_per_second(3), Ok(333_333));
        assert_eq!(interval_from_steps_per_second(i32::MAX), Ok(0));
    }

    #[test]
    fn rpm_to_pps() {
        assert_eq!(rpm_to_steps_per_second(200, 60), 200);
        assert_eq!(rpm_to_steps_per_second(200, 15), 50);
        assert_eq!(rpm_to_steps_per_second(200, -30), -100);
    }

    #[test]
    fn microstep_split() {
        assert_eq!(microstep_interval(5000, MicrostepDivisor::Quarter), 1250);
        assert_eq!(microstep_interval(5000, MicrostepDivisor::Eighth), 625);
        assert_eq!(microstep_interval(3, MicrostepDivisor::Eighth), 0);
        assert_eq!(microstep_interval(0, MicrostepDivisor::Half), 0);
    }

    #[test]
    fn carrier_follows_speed() {
        assert_eq!(carrier_hz(1250, 16), Some(12_800));
        assert_eq!(carrier_hz(625, 16), Some(25_600));
        assert_eq!(carrier_hz(0, 16), None);
    }
}
