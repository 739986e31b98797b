pub mod config;
pub mod interrupt_line;
pub mod math;
pub mod motor;
pub mod phase_table;
pub mod rate;
pub mod wiring;
