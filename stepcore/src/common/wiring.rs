use defmt_or_log::{debug, trace};
use embedded_hal::digital::PinState;

use crate::common::math::magnitude_to_duty;
use crate::common::phase_table::{MicrostepDivisor, WiringMode, coil_magnitudes, full_step_row};
use crate::{CoilOutput, Drive, PhaseRequest, PinDriver, PinId, PinMode, StepperError};

/// Most control pins any wiring uses.
pub const MAX_PINS: usize = 5;

/// Which pin does what. Built only through the validating constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wiring {
    drive: Drive,
    pins: [PinId; MAX_PINS],
    pin_count: usize,
    /// PWM pins of coil A and coil B, microstepping only
    pwm: Option<[PinId; 2]>,
}

impl Wiring {
    /// Full stepping, the wiring mode follows from the number of pins (2, 3, 4 or 5).
    pub fn from_pins(pins: &[PinId]) -> Result<Self, StepperError> {
        let mode = WiringMode::from_pin_count(pins.len())?;
        Ok(Self {
            drive: Drive::FullStep(mode),
            pins: Self::pack(pins),
            pin_count: pins.len(),
            pwm: None,
        })
    }

    /// Bipolar microstepping.
    ///
    /// `direction_pins` is either one pin per coil (H-bridge leg) or two
    /// complementary pins per coil, `pwm` sets the current of coil A and coil B.
    pub fn microstepping(
        direction_pins: &[PinId],
        pwm: [PinId; 2],
        microsteps: u8,
    ) -> Result<Self, StepperError> {
        if direction_pins.len() != 2 && direction_pins.len() != 4 {
            return Err(StepperError::InvalidPinCount(direction_pins.len() + 2));
        }
        let divisor = MicrostepDivisor::try_from(microsteps)?;
        Ok(Self {
            drive: Drive::Microstep(divisor),
            pins: Self::pack(direction_pins),
            pin_count: direction_pins.len(),
            pwm: Some(pwm),
        })
    }

    fn pack(pins: &[PinId]) -> [PinId; MAX_PINS] {
        let mut packed = [0; MAX_PINS];
        packed[..pins.len()].copy_from_slice(pins);
        packed
    }

    pub fn drive(&self) -> Drive {
        self.drive
    }
    /// Digital pins, in table column order.
    pub fn pins(&self) -> &[PinId] {
        &self.pins[..self.pin_count]
    }
    pub fn pwm_pins(&self) -> Option<[PinId; 2]> {
        self.pwm
    }
}

/// [`CoilOutput`] that turns phase requests into pin writes.
pub struct PinCoils<D: PinDriver> {
    wiring: Wiring,
    driver: D,
}

impl<D: PinDriver> PinCoils<D> {
    /// Configure every assigned pin once and start with the coils released.
    pub fn new(wiring: Wiring, mut driver: D) -> Self {
        for &pin in wiring.pins() {
            driver.configure_pin(pin, PinMode::Output);
        }
        if let Some(pwm) = wiring.pwm {
            for pin in pwm {
                driver.configure_pin(pin, PinMode::Pwm);
            }
        }
        debug!("coils configured for {:?}", wiring.drive);
        let mut coils = Self { wiring, driver };
        coils.release();
        coils
    }
    pub fn wiring(&self) -> &Wiring {
        &self.wiring
    }
    pub fn driver(&self) -> &D {
        &self.driver
    }
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
    pub fn into_inner(self) -> D {
        self.driver
    }

    fn set_coil(&mut self, coil: usize, magnitude: i8, pwm_pin: PinId) {
        let (duty, polarity) = magnitude_to_duty(magnitude, self.driver.max_duty());
        let pins = self.wiring.pins();
        if pins.len() == 2 {
            let pin = pins[coil];
            self.driver.write_digital(pin, polarity);
        } else {
            let (lead_1, lead_2) = (pins[coil * 2], pins[coil * 2 + 1]);
            self.driver.write_digital(lead_1, polarity);
            self.driver.write_digital(lead_2, !polarity);
        }
        self.driver.write_pwm_duty(pwm_pin, duty);
    }
}

impl<D: PinDriver> CoilOutput for PinCoils<D> {
    fn drive(&self) -> Drive {
        self.wiring.drive
    }

    fn energize(&mut self, request: PhaseRequest) {
        match (self.wiring.drive, request) {
            (Drive::FullStep(mode), PhaseRequest::Full { phase }) => {
                let row = full_step_row(mode, phase as usize);
                for (&pin, &level) in self.wiring.pins().iter().zip(row) {
                    self.driver.write_digital(pin, level);
                }
            }
            (Drive::Microstep(divisor), PhaseRequest::Micro { phase, micro_step }) => {
                let (a, b) = coil_magnitudes(divisor, phase as usize, micro_step as usize);
                trace!("coils {} {}", a, b);
                if let Some([pwm_a, pwm_b]) = self.wiring.pwm {
                    self.set_coil(0, a, pwm_a);
                    self.set_coil(1, b, pwm_b);
                }
            }
            (drive, request) => {
                defmt_or_log::warn!("{:?} cannot serve {:?}", drive, request);
            }
        }
    }

    fn release(&mut self) {
        match self.wiring.pwm {
            Some(pwm) => {
                for pin in pwm {
                    self.driver.write_pwm_duty(pin, 0);
                }
            }
            None => {
                for &pin in self.wiring.pins() {
                    self.driver.write_digital(pin, PinState::Low);
                }
            }
        }
    }

    fn retune(&mut self, carrier_hz: u32) {
        self.driver.retune_pwm(carrier_hz);
    }
}

#[cfg(all(feature = "std", test))]
mod tests {
    extern crate std;
    use test_log::test;

    use super::*;
    use crate::std::{PinWrite, RecordingPins};

    const H: PinState = PinState::High;
    const L: PinState = PinState::Low;

    #[test]
    fn wiring_from_pin_count() {
        let wiring = Wiring::from_pins(&[8, 9, 10]).unwrap();
        assert_eq!(wiring.drive(), Drive::FullStep(WiringMode::ThreeWire));
        assert_eq!(wiring.pins(), &[8, 9, 10]);
        assert_eq!(wiring.pwm_pins(), None);
        assert_eq!(Wiring::from_pins(&[1]), Err(StepperError::InvalidPinCount(1)));
        assert_eq!(
            Wiring::from_pins(&[1, 2, 3, 4, 5, 6]),
            Err(StepperError::InvalidPinCount(6))
        );
    }

    #[test]
    fn microstepping_is_validated() {
        let wiring = Wiring::microstepping(&[2, 3], [5, 6], 8).unwrap();
        assert_eq!(wiring.drive(), Drive::Microstep(MicrostepDivisor::Eighth));
        assert_eq!(wiring.pwm_pins(), Some([5, 6]));
        assert_eq!(
            Wiring::microstepping(&[2, 3], [5, 6], 3),
            Err(StepperError::UnsupportedMicrostep(3))
        );
        assert_eq!(
            Wiring::microstepping(&[2, 3, 4], [5, 6], 4),
            Err(StepperError::InvalidPinCount(5))
        );
    }

    #[test]
    fn pins_configured_once() {
        let wiring = Wiring::microstepping(&[2, 3, 4, 7], [5, 6], 4).unwrap();
        let coils = PinCoils::new(wiring, RecordingPins::new(1000));
        assert_eq!(
            coils.driver().configured,
            [
                (2, PinMode::Output),
                (3, PinMode::Output),
                (4, PinMode::Output),
                (7, PinMode::Output),
                (5, PinMode::Pwm),
                (6, PinMode::Pwm),
            ]
        );
    }

    #[test]
    fn four_wire_rows_reach_the_pins() {
        let wiring = Wiring::from_pins(&[8, 9, 10, 11]).unwrap();
        let mut coils = PinCoils::new(wiring, RecordingPins::new(255));
        coils.energize(PhaseRequest::Full { phase: 1 });
        let driver = coils.driver();
        assert_eq!(driver.level(8), Some(L));
        assert_eq!(driver.level(9), Some(H));
        assert_eq!(driver.level(10), Some(H));
        assert_eq!(driver.level(11), Some(L));
    }

    #[test]
    fn full_step_release_drives_low() {
        let wiring = Wiring::from_pins(&[1, 2, 3, 4, 5]).unwrap();
        let mut coils = PinCoils::new(wiring, RecordingPins::new(255));
        coils.energize(PhaseRequest::Full { phase: 0 });
        coils.release();
        for pin in 1..=5 {
            assert_eq!(coils.driver().level(pin), Some(L));
        }
    }

    #[test]
    fn microstep_two_wire_polarity_and_duty() {
        let wiring = Wiring::microstepping(&[2, 3], [5, 6], 4).unwrap();
        let mut coils = PinCoils::new(wiring, RecordingPins::new(1000));
        // (-38, 92)
        coils.energize(PhaseRequest::Micro {
            phase: 3,
            micro_step: 3,
        });
        let driver = coils.driver();
        assert_eq!(driver.level(2), Some(L));
        assert_eq!(driver.duty(5), Some(380));
        assert_eq!(driver.level(3), Some(H));
        assert_eq!(driver.duty(6), Some(920));
    }

    #[test]
    fn microstep_four_wire_leads_are_complementary() {
        let wiring = Wiring::microstepping(&[1, 2, 3, 4], [5, 6], 2).unwrap();
        let mut coils = PinCoils::new(wiring, RecordingPins::new(200));
        // (71, -71)
        coils.energize(PhaseRequest::Micro {
            phase: 1,
            micro_step: 1,
        });
        let driver = coils.driver();
        assert_eq!(driver.level(1), Some(H));
        assert_eq!(driver.level(2), Some(L));
        assert_eq!(driver.level(3), Some(L));
        assert_eq!(driver.level(4), Some(H));
        assert_eq!(driver.duty(5), Some(142));
        assert_eq!(driver.duty(6), Some(142));
    }

    #[test]
    fn microstep_release_zeroes_duty() {
        let wiring = Wiring::microstepping(&[2, 3], [5, 6], 2).unwrap();
        let mut coils = PinCoils::new(wiring, RecordingPins::new(1000));
        coils.energize(PhaseRequest::Micro {
            phase: 0,
            micro_step: 1,
        });
        coils.release();
        assert_eq!(coils.driver().duty(5), Some(0));
        assert_eq!(coils.driver().duty(6), Some(0));
        assert_eq!(
            coils.driver().writes.last(),
            Some(&PinWrite::Duty { pin: 6, duty: 0 })
        );
    }

    #[test]
    fn mismatched_request_writes_nothing() {
        let wiring = Wiring::from_pins(&[1, 2]).unwrap();
        let mut coils = PinCoils::new(wiring, RecordingPins::new(255));
        let before = coils.driver().writes.len();
        coils.energize(PhaseRequest::Micro {
            phase: 0,
            micro_step: 0,
        });
        assert_eq!(coils.driver().writes.len(), before);
    }
}
