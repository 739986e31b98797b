use embedded_hal::digital::PinState;

use crate::common::motor::Direction;

/// Move `index` one position in `direction` inside `0..modulus`.
///
/// Going up past the top wraps to 0, going down from 0 wraps to `modulus - 1`.
/// `modulus` must be at least 1.
#[inline(always)]
pub fn advance(index: u32, modulus: u32, direction: Direction) -> u32 {
    match direction {
        Direction::Forward => {
            if index + 1 >= modulus {
                0
            } else {
                index + 1
            }
        }
        Direction::Reverse => {
            if index == 0 {
                modulus - 1
            } else {
                index - 1
            }
        }
    }
}

/// Time elapsed since `last`, correct across a counter wraparound.
#[inline(always)]
pub fn elapsed_micros(now: u32, last: u32) -> u32 {
    now.wrapping_sub(last)
}

/// Convert a signed coil magnitude (-100..=100) to a duty and a polarity.
/// Zero magnitude reports the positive polarity.
#[inline(always)]
pub fn magnitude_to_duty(magnitude: i8, max_duty: u16) -> (u16, PinState) {
    let abs = (magnitude.unsigned_abs() as u32).min(100);
    let duty = (abs * max_duty as u32 / 100) as u16;
    let polarity = if magnitude >= 0 {
        PinState::High
    } else {
        PinState::Low
    };
    (duty, polarity)
}

#[cfg(all(feature = "std", test))]
mod tests {
    extern crate std;
    use test_log::test;

    use super::*;

    #[test]
    fn forward_closes_after_modulus() {
        for modulus in [4, 6, 10, 200] {
            for start in 0..modulus {
                let mut index = start;
                for k in 1..=3 * modulus {
                    index = advance(index, modulus, Direction::Forward);
                    assert_eq!(index, (start + k) % modulus);
                }
                assert_eq!(index, start);
            }
        }
    }

    #[test]
    fn reverse_never_goes_negative() {
        for modulus in [4, 6, 10] {
            let mut index = 0;
            for k in 1..=2 * modulus {
                index = advance(index, modulus, Direction::Reverse);
                assert!(index < modulus);
                assert_eq!(index, (2 * modulus - k) % modulus);
            }
            assert_eq!(index, 0);
        }
        assert_eq!(advance(0, 6, Direction::Reverse), 5);
    }

    #[test]
    fn elapsed_survives_wraparound() {
        assert_eq!(elapsed_micros(1000, 400), 600);
        assert_eq!(elapsed_micros(99, u32::MAX - 900), 1000);
    }

    #[test]
    fn duty_is_bounded() {
        for max in [255u16, 1000, u16::MAX] {
            for magnitude in -100i8..=100 {
                let (duty, polarity) = magnitude_to_duty(magnitude, max);
                assert!(duty <= max);
                if magnitude < 0 {
                    assert_eq!(polarity, PinState::Low);
                } else {
                    assert_eq!(polarity, PinState::High);
                }
            }
            assert_eq!(magnitude_to_duty(100, max).0, max);
            assert_eq!(magnitude_to_duty(-100, max).0, max);
            assert_eq!(magnitude_to_duty(0, max).0, 0);
        }
        assert_eq!(magnitude_to_duty(71, 1000), (710, PinState::High));
        assert_eq!(magnitude_to_duty(-38, 1000), (380, PinState::Low));
    }
}
