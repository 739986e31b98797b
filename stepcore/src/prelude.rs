pub use crate::common::config::StepperConfig;
pub use crate::common::interrupt_line::InterruptLine;
pub use crate::common::motor::{Direction, MotionState, Stepper};
pub use crate::common::phase_table::{MicrostepDivisor, WiringMode};
pub use crate::common::wiring::{PinCoils, Wiring};
pub use crate::{
    CoilOutput, Drive, MicrosClock, PhaseRequest, PinDriver, PinId, PinMode, StepperError,
};
