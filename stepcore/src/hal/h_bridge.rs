use defmt_or_log::{trace, warn};
use embedded_hal::{
    digital::{OutputPin, PinState},
    pwm::SetDutyCycle,
};

use crate::{PinDriver, PinId, PinMode};

/// Pins of an H-bridge (L298N, DRV8843 and the like) or a darlington array.
///
/// Pin ids `0..N` are the digital outputs, in the order given, and ids
/// `N..N + M` are the PWM channels. Channels with different resolutions
/// are scaled to the smallest one.
pub struct HBridgePins<P: OutputPin, W: SetDutyCycle, const N: usize, const M: usize> {
    outputs: [P; N],
    pwm: [W; M],
    max: u16,
}

impl<P: OutputPin, W: SetDutyCycle, const N: usize, const M: usize> HBridgePins<P, W, N, M> {
    pub fn new(outputs: [P; N], pwm: [W; M]) -> Self {
        let max = pwm
            .iter()
            .map(|channel| channel.max_duty_cycle())
            .min()
            .unwrap_or(u16::MAX);
        Self { outputs, pwm, max }
    }
    pub fn outputs(&self) -> &[P; N] {
        &self.outputs
    }
    pub fn pwm(&self) -> &[W; M] {
        &self.pwm
    }
    pub fn release(self) -> ([P; N], [W; M]) {
        (self.outputs, self.pwm)
    }
}

impl<P: OutputPin, W: SetDutyCycle, const N: usize, const M: usize> PinDriver
    for HBridgePins<P, W, N, M>
{
    fn configure_pin(&mut self, pin: PinId, mode: PinMode) {
        // the HAL already configured the peripherals, just park them
        trace!("pin {} as {:?}", pin, mode);
        match mode {
            PinMode::Output => self.write_digital(pin, PinState::Low),
            PinMode::Pwm => self.write_pwm_duty(pin, 0),
        }
    }

    fn write_digital(&mut self, pin: PinId, level: PinState) {
        let Some(output) = self.outputs.get_mut(pin as usize) else {
            warn!("no digital output {}", pin);
            return;
        };
        if output.set_state(level).is_err() {
            warn!("failed to write output {}", pin);
        }
    }

    fn write_pwm_duty(&mut self, pin: PinId, duty: u16) {
        let Some(channel) = (pin as usize)
            .checked_sub(N)
            .and_then(|index| self.pwm.get_mut(index))
        else {
            warn!("no pwm channel {}", pin);
            return;
        };
        if self.max == 0 {
            return;
        }
        let duty = duty.min(self.max);
        if channel.set_duty_cycle_fraction(duty, self.max).is_err() {
            warn!("failed to set duty of {}", pin);
        }
    }

    fn max_duty(&self) -> u16 {
        self.max
    }
}

#[cfg(all(feature = "std", test))]
mod tests {
    extern crate std;
    use core::convert::Infallible;

    use embedded_hal::{digital, pwm};
    use test_log::test;

    use super::*;
    use crate::common::config::StepperConfig;
    use crate::common::motor::Stepper;
    use crate::common::wiring::Wiring;
    use crate::std::SimClock;

    #[derive(Default)]
    struct FakePin {
        high: bool,
        writes: usize,
    }
    impl digital::ErrorType for FakePin {
        type Error = Infallible;
    }
    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    struct FakePwm {
        max: u16,
        duty: u16,
    }
    impl FakePwm {
        fn new(max: u16) -> Self {
            Self { max, duty: u16::MAX }
        }
    }
    impl pwm::ErrorType for FakePwm {
        type Error = Infallible;
    }
    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }
        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    fn pins() -> [FakePin; 2] {
        [FakePin::default(), FakePin::default()]
    }

    #[test]
    fn channels_share_smallest_resolution() {
        let mut bridge = HBridgePins::new(pins(), [FakePwm::new(1000), FakePwm::new(500)]);
        assert_eq!(bridge.max_duty(), 500);
        bridge.write_pwm_duty(2, 250);
        bridge.write_pwm_duty(3, 250);
        assert_eq!(bridge.pwm()[0].duty, 500);
        assert_eq!(bridge.pwm()[1].duty, 250);
    }

    #[test]
    fn unknown_pins_are_ignored() {
        let mut bridge = HBridgePins::new(pins(), [FakePwm::new(100)]);
        bridge.write_digital(7, PinState::High);
        bridge.write_pwm_duty(0, 50);
        bridge.write_pwm_duty(9, 50);
        assert!(bridge.outputs().iter().all(|p| p.writes == 0));
        assert_eq!(bridge.pwm()[0].duty, u16::MAX);
    }

    #[test]
    fn configure_parks_the_pins() {
        let mut bridge = HBridgePins::new(pins(), [FakePwm::new(100)]);
        bridge.configure_pin(1, PinMode::Output);
        bridge.configure_pin(2, PinMode::Pwm);
        assert_eq!(bridge.outputs()[1].writes, 1);
        assert!(!bridge.outputs()[1].high);
        assert_eq!(bridge.pwm()[0].duty, 0);
    }

    #[test]
    fn drives_a_full_step_motor() {
        let bridge = HBridgePins::<FakePin, FakePwm, 4, 0>::new(
            [
                FakePin::default(),
                FakePin::default(),
                FakePin::default(),
                FakePin::default(),
            ],
            [],
        );
        let wiring = Wiring::from_pins(&[0, 1, 2, 3]).unwrap();
        let mut stepper =
            Stepper::from_pins(StepperConfig::new(200), wiring, bridge, SimClock::new(0)).unwrap();
        stepper.set_speed_rpm(60);
        stepper.request_move(2);
        for _ in 0..2 {
            stepper.clock_mut().advance(5000);
            stepper.poll();
        }
        // phase 2 is 0101
        let levels: std::vec::Vec<bool> = stepper
            .output()
            .driver()
            .outputs()
            .iter()
            .map(|p| p.high)
            .collect();
        assert_eq!(levels, [false, true, false, true]);
    }

    #[test]
    fn drives_a_microstepping_bridge() {
        let bridge = HBridgePins::new(pins(), [FakePwm::new(1000), FakePwm::new(1000)]);
        let wiring = Wiring::microstepping(&[0, 1], [2, 3], 4).unwrap();
        let mut stepper =
            Stepper::from_pins(StepperConfig::new(200), wiring, bridge, SimClock::new(0)).unwrap();
        stepper.set_speed_rpm(60);
        stepper.request_move(2);
        for _ in 0..2 {
            stepper.clock_mut().advance(1250);
            stepper.poll();
        }
        // (71, 71)
        let bridge = stepper.output().driver();
        assert!(bridge.outputs()[0].high);
        assert!(bridge.outputs()[1].high);
        assert_eq!(bridge.pwm()[0].duty, 710);
        assert_eq!(bridge.pwm()[1].duty, 710);

        stepper.shutdown();
        let bridge = stepper.output().driver();
        assert_eq!(bridge.pwm()[0].duty, 0);
        assert_eq!(bridge.pwm()[1].duty, 0);
    }
}
