/*!
Std only implementations: simulated clock and recording outputs used by the tests and the demos
*/
extern crate std;
use std::vec::Vec;

use defmt_or_log::trace;
use embedded_hal::digital::PinState;

use crate::{CoilOutput, Drive, MicrosClock, PhaseRequest, PinDriver, PinId, PinMode};

/// Clock that only moves when told to.
///
/// With an auto step every read moves it forward, which is enough to drive
/// the run loop without a real timer.
pub struct SimClock {
    now: u32,
    auto_step: u32,
}

impl SimClock {
    pub fn new(start: u32) -> Self {
        Self::with_auto_step(start, 0)
    }
    pub fn with_auto_step(start: u32, auto_step: u32) -> Self {
        Self {
            now: start,
            auto_step,
        }
    }
    /// move forward by `micros`, returns the new time
    pub fn advance(&mut self, micros: u32) -> u32 {
        self.now = self.now.wrapping_add(micros);
        self.now
    }
}

impl MicrosClock for SimClock {
    fn now_micros(&mut self) -> u32 {
        self.now = self.now.wrapping_add(self.auto_step);
        self.now
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    Energize(PhaseRequest),
    Release,
    Retune(u32),
}

/// [`CoilOutput`] that just remembers what it was asked.
pub struct RecordingOutput {
    drive: Drive,
    pub events: Vec<OutputEvent>,
}

impl RecordingOutput {
    pub fn new(drive: Drive) -> Self {
        Self {
            drive,
            events: Vec::new(),
        }
    }
    pub fn energize_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, OutputEvent::Energize(_)))
            .count()
    }
    /// phases of every full step request, in order
    pub fn full_phases(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Energize(PhaseRequest::Full { phase }) => Some(*phase),
                _ => None,
            })
            .collect()
    }
    /// `(phase, micro_step)` of every microstep request, in order
    pub fn micro_phases(&self) -> Vec<(u8, u8)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Energize(PhaseRequest::Micro { phase, micro_step }) => {
                    Some((*phase, *micro_step))
                }
                _ => None,
            })
            .collect()
    }
}

impl CoilOutput for RecordingOutput {
    fn drive(&self) -> Drive {
        self.drive
    }
    fn energize(&mut self, request: PhaseRequest) {
        trace!("energize {:?}", request);
        self.events.push(OutputEvent::Energize(request));
    }
    fn release(&mut self) {
        self.events.push(OutputEvent::Release);
    }
    fn retune(&mut self, carrier_hz: u32) {
        self.events.push(OutputEvent::Retune(carrier_hz));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinWrite {
    Level { pin: PinId, level: PinState },
    Duty { pin: PinId, duty: u16 },
}

/// [`PinDriver`] keeping every write in order.
pub struct RecordingPins {
    max_duty: u16,
    pub configured: Vec<(PinId, PinMode)>,
    pub writes: Vec<PinWrite>,
    pub carrier_hz: Option<u32>,
}

impl RecordingPins {
    pub fn new(max_duty: u16) -> Self {
        Self {
            max_duty,
            configured: Vec::new(),
            writes: Vec::new(),
            carrier_hz: None,
        }
    }
    /// last level written on `pin`
    pub fn level(&self, pin: PinId) -> Option<PinState> {
        self.writes.iter().rev().find_map(|w| match *w {
            PinWrite::Level { pin: p, level } if p == pin => Some(level),
            _ => None,
        })
    }
    /// last duty written on `pin`
    pub fn duty(&self, pin: PinId) -> Option<u16> {
        self.writes.iter().rev().find_map(|w| match *w {
            PinWrite::Duty { pin: p, duty } if p == pin => Some(duty),
            _ => None,
        })
    }
    /// every duty ever written, on any pin
    pub fn duties(&self) -> impl Iterator<Item = u16> + '_ {
        self.writes.iter().filter_map(|w| match *w {
            PinWrite::Duty { duty, .. } => Some(duty),
            _ => None,
        })
    }
}

impl PinDriver for RecordingPins {
    fn configure_pin(&mut self, pin: PinId, mode: PinMode) {
        self.configured.push((pin, mode));
    }
    fn write_digital(&mut self, pin: PinId, level: PinState) {
        self.writes.push(PinWrite::Level { pin, level });
    }
    fn write_pwm_duty(&mut self, pin: PinId, duty: u16) {
        self.writes.push(PinWrite::Duty { pin, duty });
    }
    fn max_duty(&self) -> u16 {
        self.max_duty
    }
    fn retune_pwm(&mut self, carrier_hz: u32) {
        self.carrier_hz = Some(carrier_hz);
    }
}
