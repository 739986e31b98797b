use embedded_hal::digital::PinState;

use crate::common::phase_table::{MicrostepDivisor, WiringMode};

/// Platform identifier of a pin, whatever the board numbering is.
pub type PinId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// plain push-pull digital output
    Output,
    /// output driven by a PWM channel
    Pwm,
}

/// The four primitives the host platform has to provide.
/// Writes are considered infallible, a driver that can fail should log and carry on.
pub trait PinDriver {
    /// called once per assigned pin, when the coils are built
    fn configure_pin(&mut self, pin: PinId, mode: PinMode);
    fn write_digital(&mut self, pin: PinId, level: PinState);
    /// `duty` goes from 0 to [`PinDriver::max_duty`]
    fn write_pwm_duty(&mut self, pin: PinId, duty: u16);
    fn max_duty(&self) -> u16;
    /// Change the PWM carrier frequency. Drivers with a fixed carrier can ignore it.
    fn retune_pwm(&mut self, _carrier_hz: u32) {}
}

/// Monotonic microsecond counter. It is allowed (and expected) to wrap around.
pub trait MicrosClock {
    fn now_micros(&mut self) -> u32;
}

/// How the coils are stepped, decides the phase modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    FullStep(WiringMode),
    Microstep(MicrostepDivisor),
}

impl Drive {
    /// Length of the phase cycle.
    pub fn modulus(&self) -> u32 {
        match self {
            Drive::FullStep(mode) => mode.modulus(),
            Drive::Microstep(_) => WiringMode::FourWire.modulus(),
        }
    }
    /// Microsteps each full step is divided into, 1 when not microstepping.
    pub fn microsteps(&self) -> u32 {
        match self {
            Drive::FullStep(_) => 1,
            Drive::Microstep(divisor) => divisor.per_step() as u32,
        }
    }
}

/// What the sequencer asks the coils to do after each advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseRequest {
    Full { phase: u8 },
    Micro { phase: u8, micro_step: u8 },
}

/// Coil driver adapter as seen by the sequencer.
/// It only receives requests, it never calls back into the sequencer.
pub trait CoilOutput {
    fn drive(&self) -> Drive;
    /// Energize the coils for the given phase. Called exactly once per advance.
    fn energize(&mut self, request: PhaseRequest);
    /// Remove holding torque from every coil.
    fn release(&mut self);
    fn retune(&mut self, _carrier_hz: u32) {}
}
