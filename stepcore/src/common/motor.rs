use defmt_or_log::{debug, trace, warn};
use embassy_futures::yield_now;

use crate::common::config::StepperConfig;
use crate::common::interrupt_line::InterruptLine;
use crate::common::math::{advance, elapsed_micros};
use crate::common::rate;
use crate::common::wiring::{PinCoils, Wiring};
use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// nothing left to do
    Idle,
    /// steps pending, waiting for the next interval to elapse
    Advancing,
    /// stopped by [`Stepper::interrupt`], stays here until [`Stepper::clear_interrupt`]
    Interrupted,
}

/// Step sequencer for one motor.
///
/// Owns the position in the phase cycle and the pending move, and asks the
/// [`CoilOutput`] to energize the next phase whenever enough time has passed.
/// The unit of a move is a full step, or a microstep when the output microsteps.
///
/// An instance must be polled from a single task, there is no internal locking.
pub struct Stepper<O: CoilOutput, C: MicrosClock> {
    output: O,
    clock: C,
    config: StepperConfig,
    drive: Drive,

    state: MotionState,
    direction: Direction,
    /// position in the revolution, 0..steps_per_revolution
    step_number: u32,
    /// 0..microsteps per step, always 0 when full stepping
    micro_step: u32,
    steps_remaining: u32,

    /// full step interval, 0 disables advancement
    step_interval: u32,
    /// interval between two advances, the microstep one when microstepping
    interval: u32,
    last_step_micros: u32,
}

impl<D: PinDriver, C: MicrosClock> Stepper<PinCoils<D>, C> {
    /// Build a stepper on raw pins. Every pin is configured once here.
    pub fn from_pins(
        config: StepperConfig,
        wiring: Wiring,
        driver: D,
        clock: C,
    ) -> Result<Self, StepperError> {
        config.validate()?;
        Self::new(config, PinCoils::new(wiring, driver), clock)
    }
}

impl<O: CoilOutput, C: MicrosClock> Stepper<O, C> {
    pub fn new(config: StepperConfig, output: O, clock: C) -> Result<Self, StepperError> {
        config.validate()?;
        let drive = output.drive();
        debug!(
            "stepper with {} steps/rev, {:?}",
            config.steps_per_revolution, drive
        );
        Ok(Self {
            output,
            clock,
            config,
            drive,
            state: MotionState::Idle,
            direction: Direction::Forward,
            step_number: 0,
            micro_step: 0,
            steps_remaining: 0,
            step_interval: 0,
            interval: 0,
            last_step_micros: 0,
        })
    }

    /// Set the speed in revolutions per minute. `rpm <= 0`, or a speed so high
    /// the interval truncates to 0, parks the motor.
    pub fn set_speed_rpm(&mut self, rpm: i32) {
        let interval = rate::interval_from_rpm(self.config.steps_per_revolution, rpm);
        self.apply_interval(interval);
    }

    /// Set the speed in full steps per second. `pps <= 0` parks the motor.
    pub fn set_speed_steps_per_second(&mut self, pps: i32) {
        self.apply_interval(rate::interval_from_steps_per_second(pps));
    }

    fn apply_interval(&mut self, interval: Result<u32, StepperError>) {
        self.step_interval = match interval {
            Ok(interval) => interval,
            Err(e) => {
                warn!("{:?}, advancement disabled", e);
                0
            }
        };
        self.interval = match self.drive {
            Drive::FullStep(_) => self.step_interval,
            Drive::Microstep(divisor) => {
                let interval = rate::microstep_interval(self.step_interval, divisor);
                if let Some(hz) = rate::carrier_hz(interval, self.config.pwm_carrier_multiplier) {
                    self.output.retune(hz);
                }
                interval
            }
        };
        trace!("step interval {}us, advance every {}us", self.step_interval, self.interval);
    }

    /// Start a move of `count` units, negative goes in reverse.
    /// Replaces whatever move was in progress.
    pub fn request_move(&mut self, count: i32) {
        self.steps_remaining = count.unsigned_abs();
        self.direction = if count > 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        };
        if self.state != MotionState::Interrupted {
            self.state = self.running_state();
        }
        debug!("move of {} towards {:?}", self.steps_remaining, self.direction);
    }

    fn running_state(&self) -> MotionState {
        if self.steps_remaining > 0 {
            MotionState::Advancing
        } else {
            MotionState::Idle
        }
    }

    /// Advance at most once, reading the time from the clock.
    /// Returns the steps still to do.
    pub fn poll(&mut self) -> u32 {
        let now = self.clock.now_micros();
        self.poll_at(now)
    }

    /// Advance at most once, as if the time was `now`.
    pub fn poll_at(&mut self, now: u32) -> u32 {
        if self.state != MotionState::Advancing || self.interval == 0 {
            return self.steps_remaining;
        }
        if elapsed_micros(now, self.last_step_micros) < self.interval {
            return self.steps_remaining;
        }
        self.last_step_micros = now;
        self.step_once();
        self.steps_remaining -= 1;
        if self.steps_remaining == 0 {
            self.state = MotionState::Idle;
            if self.config.release_after_move {
                self.output.release();
            }
            debug!("move done at step {}", self.step_number);
        }
        self.steps_remaining
    }

    fn step_once(&mut self) {
        let microsteps = self.drive.microsteps();
        let crossed = if microsteps == 1 {
            true
        } else {
            self.micro_step = advance(self.micro_step, microsteps, self.direction);
            match self.direction {
                Direction::Forward => self.micro_step == 0,
                Direction::Reverse => self.micro_step == microsteps - 1,
            }
        };
        if crossed {
            self.step_number = advance(
                self.step_number,
                self.config.steps_per_revolution,
                self.direction,
            );
        }
        let phase = self.phase() as u8;
        let request = match self.drive {
            Drive::FullStep(_) => PhaseRequest::Full { phase },
            Drive::Microstep(_) => PhaseRequest::Micro {
                phase,
                micro_step: self.micro_step as u8,
            },
        };
        self.output.energize(request);
    }

    /// Stop advancing, the pending steps stay as they are. Returns them.
    pub fn interrupt(&mut self) -> u32 {
        if self.state != MotionState::Interrupted {
            debug!("interrupted with {} steps left", self.steps_remaining);
            self.state = MotionState::Interrupted;
        }
        self.steps_remaining
    }

    /// Re-arm after [`Stepper::interrupt`], the pending steps resume.
    pub fn clear_interrupt(&mut self) {
        if self.state == MotionState::Interrupted {
            self.state = self.running_state();
        }
    }

    /// De-energize every coil, dropping the move in progress.
    /// Returns the steps that were not done.
    pub fn shutdown(&mut self) -> u32 {
        let undone = self.steps_remaining;
        self.steps_remaining = 0;
        if self.state == MotionState::Advancing {
            self.state = MotionState::Idle;
        }
        self.output.release();
        debug!("shutdown, {} steps dropped", undone);
        undone
    }

    /// Poll until the move is over, yielding to the executor between polls.
    ///
    /// Returns right away when the speed is disabled, and with the undone steps
    /// when `line` is raised.
    pub async fn run_until_done(&mut self, line: &InterruptLine) -> u32 {
        loop {
            if line.is_raised() {
                return self.interrupt();
            }
            if self.state != MotionState::Advancing || self.interval == 0 {
                return self.steps_remaining;
            }
            self.poll();
            yield_now().await;
        }
    }

    pub fn steps_remaining(&self) -> u32 {
        self.steps_remaining
    }
    pub fn state(&self) -> MotionState {
        self.state
    }
    pub fn direction(&self) -> Direction {
        self.direction
    }
    pub fn step_number(&self) -> u32 {
        self.step_number
    }
    /// row of the phase table for the current step
    pub fn phase(&self) -> u32 {
        self.step_number % self.drive.modulus()
    }
    pub fn micro_step(&self) -> u32 {
        self.micro_step
    }
    pub fn step_interval_micros(&self) -> u32 {
        self.step_interval
    }
    /// false when the speed is zero or invalid
    pub fn is_enabled(&self) -> bool {
        self.interval != 0
    }
    pub fn config(&self) -> &StepperConfig {
        &self.config
    }
    pub fn output(&self) -> &O {
        &self.output
    }
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

#[cfg(all(feature = "std", test))]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use embedded_hal::digital::PinState;
    use test_log::test;

    use super::*;
    use crate::common::phase_table::{MicrostepDivisor, WiringMode};
    use crate::std::{OutputEvent, RecordingOutput, RecordingPins, SimClock};

    fn full_step(mode: WiringMode, steps: u32) -> Stepper<RecordingOutput, SimClock> {
        Stepper::new(
            StepperConfig::new(steps),
            RecordingOutput::new(Drive::FullStep(mode)),
            SimClock::new(0),
        )
        .unwrap()
    }

    fn micro_step(divisor: MicrostepDivisor) -> Stepper<RecordingOutput, SimClock> {
        Stepper::new(
            StepperConfig::new(200),
            RecordingOutput::new(Drive::Microstep(divisor)),
            SimClock::new(0),
        )
        .unwrap()
    }

    /// poll every `tick` microseconds until idle, returns the time of every emission
    fn drain(stepper: &mut Stepper<RecordingOutput, SimClock>, tick: u32, max_polls: usize) -> Vec<u32> {
        let mut fired = Vec::new();
        for _ in 0..max_polls {
            if stepper.state() != MotionState::Advancing {
                break;
            }
            let now = stepper.clock_mut().advance(tick);
            let before = stepper.output().energize_count();
            stepper.poll();
            if stepper.output().energize_count() > before {
                fired.push(now);
            }
        }
        fired
    }

    #[test]
    fn zero_steps_per_revolution_is_rejected() {
        let ret = Stepper::new(
            StepperConfig::new(0),
            RecordingOutput::new(Drive::FullStep(WiringMode::FourWire)),
            SimClock::new(0),
        );
        assert_eq!(ret.err(), Some(StepperError::ZeroStepsPerRevolution));
    }

    #[test]
    fn full_revolution_at_60_rpm() {
        let mut stepper = full_step(WiringMode::FourWire, 200);
        stepper.set_speed_rpm(60);
        assert_eq!(stepper.step_interval_micros(), 5000);
        stepper.request_move(200);
        assert_eq!(stepper.state(), MotionState::Advancing);

        let fired = drain(&mut stepper, 5000, 1000);
        assert_eq!(fired.len(), 200);
        assert!(fired.windows(2).all(|w| w[1] - w[0] == 5000));
        assert_eq!(stepper.steps_remaining(), 0);
        assert_eq!(stepper.state(), MotionState::Idle);
        assert_eq!(stepper.step_number(), 0);
        assert_eq!(stepper.output().energize_count(), 200);
    }

    #[test]
    fn emissions_respect_the_interval() {
        let mut stepper = full_step(WiringMode::TwoWire, 200);
        stepper.set_speed_steps_per_second(1000);
        stepper.request_move(10);
        // polling faster than the interval only fires once per millisecond
        let fired = drain(&mut stepper, 250, 1000);
        assert_eq!(fired.len(), 10);
        assert!(fired.windows(2).all(|w| w[1] - w[0] == 1000));
    }

    #[test]
    fn forward_phases_cycle() {
        let mut stepper = full_step(WiringMode::FivePhase, 200);
        stepper.set_speed_steps_per_second(100);
        stepper.request_move(12);
        drain(&mut stepper, 10_000, 100);
        let phases = stepper.output().full_phases();
        assert_eq!(phases, [1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 1, 2]);
        assert_eq!(stepper.step_number(), 12);
    }

    #[test]
    fn reverse_wraps_at_zero() {
        let mut stepper = full_step(WiringMode::ThreeWire, 200);
        stepper.set_speed_steps_per_second(100);
        stepper.request_move(-8);
        assert_eq!(stepper.direction(), Direction::Reverse);
        drain(&mut stepper, 10_000, 100);
        // 199 % 6 = 1
        assert_eq!(stepper.output().full_phases(), [1, 0, 5, 4, 3, 2, 1, 0]);
        assert_eq!(stepper.step_number(), 192);
        assert_eq!(stepper.phase(), 0);
    }

    #[test]
    fn phase_follows_step_number_across_revolution() {
        // 50 is not a multiple of 4, the phase restarts with the revolution
        let mut stepper = full_step(WiringMode::FourWire, 50);
        stepper.set_speed_steps_per_second(100);
        stepper.request_move(51);
        drain(&mut stepper, 10_000, 1000);
        let expected: Vec<u8> = (1..=51u32).map(|k| (k % 50 % 4) as u8).collect();
        let phases = stepper.output().full_phases();
        assert_eq!(phases, expected);
        assert_eq!(&phases[47..], [0, 1, 0, 1]);
        assert_eq!(stepper.step_number(), 1);
        assert_eq!(stepper.phase(), 1);
    }

    #[test]
    fn wrapped_revolution_drives_the_step_row() {
        let wiring = Wiring::from_pins(&[8, 9, 10, 11]).unwrap();
        let mut stepper = Stepper::from_pins(
            StepperConfig::new(50),
            wiring,
            RecordingPins::new(255),
            SimClock::new(0),
        )
        .unwrap();
        stepper.set_speed_steps_per_second(100);
        stepper.request_move(51);
        for _ in 0..51 {
            stepper.clock_mut().advance(10_000);
            stepper.poll();
        }
        assert_eq!(stepper.steps_remaining(), 0);
        // step 1 is 0110
        let pins = stepper.output().driver();
        let levels: Vec<_> = [8, 9, 10, 11].iter().map(|&p| pins.level(p)).collect();
        assert_eq!(
            levels,
            [
                Some(PinState::Low),
                Some(PinState::High),
                Some(PinState::High),
                Some(PinState::Low)
            ]
        );
    }

    #[test]
    fn speed_too_high_to_represent_disables() {
        let mut stepper = full_step(WiringMode::FourWire, 200);
        stepper.set_speed_rpm(1_000_000);
        assert_eq!(stepper.step_interval_micros(), 0);
        assert!(!stepper.is_enabled());
        stepper.request_move(5);
        for t in 0..20 {
            assert_eq!(stepper.poll_at(t * 10), 5);
        }
        assert_eq!(stepper.output().energize_count(), 0);
    }

    #[test]
    fn disabled_speed_never_moves() {
        for rpm in [0, -5] {
            let mut stepper = full_step(WiringMode::FourWire, 200);
            stepper.set_speed_rpm(rpm);
            assert!(!stepper.is_enabled());
            stepper.request_move(50);
            for t in 0..100 {
                stepper.poll_at(t * 100_000);
            }
            assert_eq!(stepper.steps_remaining(), 50);
            assert_eq!(stepper.output().energize_count(), 0);
        }
        let mut stepper = full_step(WiringMode::FourWire, 200);
        stepper.set_speed_steps_per_second(0);
        stepper.request_move(3);
        assert_eq!(stepper.poll_at(1_000_000), 3);
    }

    #[test]
    fn speed_change_keeps_move() {
        let mut stepper = full_step(WiringMode::FourWire, 200);
        stepper.request_move(4);
        stepper.set_speed_rpm(0);
        assert_eq!(stepper.poll_at(10_000), 4);
        stepper.set_speed_rpm(60);
        assert_eq!(stepper.poll_at(10_000), 3);
    }

    #[test]
    fn new_request_overwrites() {
        let mut stepper = full_step(WiringMode::FourWire, 200);
        stepper.set_speed_steps_per_second(100);
        stepper.request_move(10);
        drain(&mut stepper, 10_000, 3);
        assert_eq!(stepper.steps_remaining(), 7);
        stepper.request_move(-2);
        assert_eq!(stepper.steps_remaining(), 2);
        drain(&mut stepper, 10_000, 100);
        assert_eq!(stepper.output().full_phases(), [1, 2, 3, 2, 1]);
        stepper.request_move(0);
        assert_eq!(stepper.state(), MotionState::Idle);
    }

    #[test]
    fn timer_wraparound_is_transparent() {
        let mut stepper = full_step(WiringMode::FourWire, 200);
        stepper.set_speed_rpm(60);
        stepper.request_move(3);
        let start = u32::MAX - 7000;
        assert_eq!(stepper.poll_at(start), 2);
        assert_eq!(stepper.poll_at(start.wrapping_add(4999)), 2);
        assert_eq!(stepper.poll_at(start.wrapping_add(5000)), 1);
        // this one is past the wrap
        assert_eq!(stepper.poll_at(start.wrapping_add(9999)), 1);
        assert_eq!(stepper.poll_at(start.wrapping_add(10_000)), 0);
    }

    #[test]
    fn interrupt_halts_until_cleared() {
        let mut stepper = full_step(WiringMode::FourWire, 200);
        stepper.set_speed_rpm(60);
        stepper.request_move(10);
        drain(&mut stepper, 5000, 4);
        assert_eq!(stepper.interrupt(), 6);
        assert_eq!(stepper.state(), MotionState::Interrupted);

        let emitted = stepper.output().energize_count();
        for _ in 0..50 {
            stepper.clock_mut().advance(5000);
            stepper.poll();
        }
        assert_eq!(stepper.output().energize_count(), emitted);
        assert_eq!(stepper.steps_remaining(), 6);

        // a new request while interrupted is stored, not run
        stepper.request_move(8);
        stepper.clock_mut().advance(5000);
        assert_eq!(stepper.poll(), 8);

        stepper.clear_interrupt();
        assert_eq!(stepper.state(), MotionState::Advancing);
        drain(&mut stepper, 5000, 100);
        assert_eq!(stepper.output().energize_count(), emitted + 8);
    }

    #[test]
    fn clearing_without_steps_goes_idle() {
        let mut stepper = full_step(WiringMode::FourWire, 200);
        stepper.interrupt();
        stepper.clear_interrupt();
        assert_eq!(stepper.state(), MotionState::Idle);
    }

    #[test]
    fn shutdown_stops_and_releases() {
        let mut stepper = full_step(WiringMode::FourWire, 200);
        stepper.set_speed_rpm(60);
        stepper.request_move(10);
        drain(&mut stepper, 5000, 2);
        assert_eq!(stepper.shutdown(), 8);
        assert_eq!(stepper.state(), MotionState::Idle);
        assert_eq!(stepper.output().events.last(), Some(&OutputEvent::Release));
        stepper.clock_mut().advance(50_000);
        assert_eq!(stepper.poll(), 0);
        assert_eq!(stepper.output().energize_count(), 2);
    }

    #[test]
    fn release_after_move() {
        let config = StepperConfig {
            release_after_move: true,
            ..StepperConfig::new(200)
        };
        let mut stepper = Stepper::new(
            config,
            RecordingOutput::new(Drive::FullStep(WiringMode::FourWire)),
            SimClock::new(0),
        )
        .unwrap();
        stepper.set_speed_rpm(60);
        stepper.request_move(3);
        drain(&mut stepper, 5000, 10);
        let events = &stepper.output().events;
        assert_eq!(events.len(), 4);
        assert_eq!(events[3], OutputEvent::Release);
    }

    #[test]
    fn quarter_step_counts_microsteps() {
        let mut stepper = micro_step(MicrostepDivisor::Quarter);
        stepper.set_speed_rpm(60);
        assert_eq!(stepper.step_interval_micros(), 5000);
        // 1250us per microstep, carrier 800 microsteps/s * 16
        assert_eq!(stepper.output().events[0], OutputEvent::Retune(12_800));

        stepper.request_move(6);
        let fired = drain(&mut stepper, 1250, 100);
        assert_eq!(fired.len(), 6);
        assert_eq!(
            stepper.output().micro_phases(),
            [(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)]
        );
        assert_eq!(stepper.step_number(), 1);
        assert_eq!(stepper.micro_step(), 2);
    }

    #[test]
    fn microsteps_reverse_across_zero() {
        let mut stepper = micro_step(MicrostepDivisor::Half);
        stepper.set_speed_steps_per_second(10);
        stepper.request_move(-3);
        drain(&mut stepper, 50_000, 100);
        assert_eq!(stepper.output().micro_phases(), [(3, 1), (3, 0), (2, 1)]);
        assert_eq!(stepper.step_number(), 198);
    }

    #[test]
    fn microstep_revolution_closes() {
        let mut stepper = micro_step(MicrostepDivisor::Eighth);
        stepper.set_speed_rpm(120);
        stepper.request_move(200 * 8);
        drain(&mut stepper, 10_000, 10_000);
        assert_eq!(stepper.steps_remaining(), 0);
        assert_eq!(stepper.step_number(), 0);
        assert_eq!(stepper.phase(), 0);
        assert_eq!(stepper.micro_step(), 0);
    }

    #[test]
    fn pin_backed_quarter_step_duties() {
        let wiring = Wiring::microstepping(&[2, 3], [5, 6], 4).unwrap();
        let mut stepper = Stepper::from_pins(
            StepperConfig::new(200),
            wiring,
            RecordingPins::new(1000),
            SimClock::new(0),
        )
        .unwrap();
        stepper.set_speed_rpm(60);
        stepper.request_move(-1);
        stepper.clock_mut().advance(1250);
        stepper.poll();
        // (-38, 92)
        let pins = stepper.output().driver();
        assert_eq!(pins.duty(5), Some(380));
        assert_eq!(pins.duty(6), Some(920));
        assert_eq!(pins.carrier_hz, Some(12_800));
        assert!(pins.duties().all(|duty| duty <= 1000));
    }

    #[test(tokio::test)]
    async fn run_until_done_completes() {
        let mut stepper = Stepper::new(
            StepperConfig::new(200),
            RecordingOutput::new(Drive::FullStep(WiringMode::FourWire)),
            SimClock::with_auto_step(0, 1000),
        )
        .unwrap();
        stepper.set_speed_rpm(60);
        stepper.request_move(-40);
        let line = InterruptLine::new();
        assert_eq!(stepper.run_until_done(&line).await, 0);
        assert_eq!(stepper.output().energize_count(), 40);
        assert_eq!(stepper.step_number(), 160);
    }

    #[test(tokio::test)]
    async fn run_until_done_returns_when_disabled() {
        let mut stepper = full_step(WiringMode::FourWire, 200);
        stepper.request_move(5);
        let line = InterruptLine::new();
        assert_eq!(stepper.run_until_done(&line).await, 5);
        assert_eq!(stepper.state(), MotionState::Advancing);
    }

    /// raises the line after a given number of phases
    struct Tripwire {
        inner: RecordingOutput,
        line: &'static InterruptLine,
        after: usize,
    }

    impl CoilOutput for Tripwire {
        fn drive(&self) -> Drive {
            self.inner.drive()
        }
        fn energize(&mut self, request: PhaseRequest) {
            self.inner.energize(request);
            if self.inner.energize_count() == self.after {
                self.line.raise();
            }
        }
        fn release(&mut self) {
            self.inner.release();
        }
    }

    #[test(tokio::test)]
    async fn run_until_done_observes_the_line() {
        static LINE: InterruptLine = InterruptLine::new();
        let output = Tripwire {
            inner: RecordingOutput::new(Drive::FullStep(WiringMode::FourWire)),
            line: &LINE,
            after: 15,
        };
        let mut stepper =
            Stepper::new(StepperConfig::new(200), output, SimClock::with_auto_step(0, 5000)).unwrap();
        stepper.set_speed_rpm(60);
        stepper.request_move(100);

        assert_eq!(stepper.run_until_done(&LINE).await, 85);
        assert_eq!(stepper.state(), MotionState::Interrupted);
        // still interrupted, nothing moves
        LINE.clear();
        assert_eq!(stepper.run_until_done(&LINE).await, 85);
        assert_eq!(stepper.output().inner.energize_count(), 15);

        stepper.clear_interrupt();
        assert_eq!(stepper.run_until_done(&LINE).await, 0);
        assert_eq!(stepper.output().inner.energize_count(), 100);
        assert_eq!(stepper.step_number(), 100);
    }

    #[test]
    fn blocking_on_the_run_loop() {
        let mut stepper = Stepper::new(
            StepperConfig::new(48),
            RecordingOutput::new(Drive::FullStep(WiringMode::TwoWire)),
            SimClock::with_auto_step(0, 500),
        )
        .unwrap();
        stepper.set_speed_steps_per_second(500);
        stepper.request_move(48);
        let line = InterruptLine::new();
        let left = embassy_futures::block_on(stepper.run_until_done(&line));
        assert_eq!(left, 0);
        assert_eq!(stepper.step_number(), 0);
        assert_eq!(stepper.phase(), 0);
    }
}
