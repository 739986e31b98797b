use std::time::Duration;

use embedded_hal::digital::PinState;
use stepcore::{EmbassyClock, prelude::*};
use tokio::time::{Instant, sleep};

/// Prints the pin levels after every write burst instead of driving hardware.
struct ConsolePins {
    levels: [char; 8],
    duties: [u16; 8],
}

impl PinDriver for ConsolePins {
    fn configure_pin(&mut self, pin: PinId, mode: PinMode) {
        println!("pin {pin} configured as {mode:?}");
    }
    fn write_digital(&mut self, pin: PinId, level: PinState) {
        self.levels[pin as usize] = if level == PinState::High { '1' } else { '0' };
    }
    fn write_pwm_duty(&mut self, pin: PinId, duty: u16) {
        self.duties[pin as usize] = duty;
    }
    fn max_duty(&self) -> u16 {
        1000
    }
    fn retune_pwm(&mut self, carrier_hz: u32) {
        println!("pwm carrier retuned to {carrier_hz}Hz");
    }
}

impl ConsolePins {
    fn new() -> Self {
        Self {
            levels: ['-'; 8],
            duties: [0; 8],
        }
    }
    fn show(&self) -> String {
        let levels: String = self.levels.iter().collect();
        format!("{levels} duty {:?}", &self.duties[4..6])
    }
}

#[tokio::main]
async fn main() {
    let line = InterruptLine::new();

    let wiring = Wiring::from_pins(&[0, 1, 2, 3]).expect("four pins are a valid wiring");
    let mut stepper = Stepper::from_pins(
        StepperConfig::new(200),
        wiring,
        ConsolePins::new(),
        EmbassyClock,
    )
    .expect("valid configuration");
    stepper.set_speed_rpm(60);
    println!("full step, {}us per step", stepper.step_interval_micros());

    stepper.request_move(200);
    let start = Instant::now();
    let left = stepper.run_until_done(&line).await;
    println!(
        "one revolution in {:?}, {} steps left, at step {} ({})",
        start.elapsed(),
        left,
        stepper.step_number(),
        stepper.output().driver().show()
    );
    stepper.shutdown();

    let wiring = Wiring::microstepping(&[0, 1, 2, 3], [4, 5], 4).expect("valid microstep wiring");
    let mut stepper = Stepper::from_pins(
        StepperConfig::new(200),
        wiring,
        ConsolePins::new(),
        EmbassyClock,
    )
    .expect("valid configuration");
    stepper.set_speed_rpm(120);
    stepper.request_move(-16);
    while stepper.state() == MotionState::Advancing {
        if stepper.steps_remaining() != stepper.poll() {
            println!(
                "step {} micro {}: {}",
                stepper.step_number(),
                stepper.micro_step(),
                stepper.output().driver().show()
            );
        }
        sleep(Duration::from_micros(100)).await;
    }
    stepper.shutdown();
    println!("released: {}", stepper.output().driver().show());
}
