use serde::{Deserialize, Serialize};

use crate::StepperError;

/// Per motor settings that are not tied to the pin topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepperConfig {
    /// full steps in one revolution of the shaft
    pub steps_per_revolution: u32,
    /// de-energize the coils once a move completes, lets the motor cool down
    /// and be moved by hand, at the cost of holding torque
    pub release_after_move: bool,
    /// PWM carrier in Hz per microstep/s, only used when microstepping
    pub pwm_carrier_multiplier: u32,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: 200,
            release_after_move: false,
            pwm_carrier_multiplier: 16,
        }
    }
}

impl StepperConfig {
    pub fn new(steps_per_revolution: u32) -> Self {
        Self {
            steps_per_revolution,
            ..Self::default()
        }
    }
    pub fn validate(&self) -> Result<(), StepperError> {
        if self.steps_per_revolution == 0 {
            return Err(StepperError::ZeroStepsPerRevolution);
        }
        Ok(())
    }
}

#[cfg(all(feature = "std", test))]
mod tests {
    extern crate std;
    use test_log::test;

    use super::*;

    #[test]
    fn zero_steps_is_invalid() {
        assert_eq!(
            StepperConfig::new(0).validate(),
            Err(StepperError::ZeroStepsPerRevolution)
        );
        assert_eq!(StepperConfig::new(48).validate(), Ok(()));
        assert_eq!(StepperConfig::default().steps_per_revolution, 200);
    }

    #[test]
    fn survives_the_wire() {
        let config = StepperConfig {
            steps_per_revolution: 400,
            release_after_move: true,
            pwm_carrier_multiplier: 32,
        };
        let mut buf = [0u8; 16];
        let encoded = postcard::to_slice(&config, &mut buf).unwrap();
        let decoded: StepperConfig = postcard::from_bytes(encoded).unwrap();
        assert_eq!(decoded, config);
    }
}
