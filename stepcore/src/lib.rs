#![no_std]
//! Stepper motor sequencing: phase tables, step timing and microstepping,
//! independent from the board it runs on.

#[cfg(feature = "std")]
pub mod std;

pub mod hal;
pub use hal::*;

pub mod common;

mod error;
pub use error::*;

mod traits;
pub use traits::*;

mod impl_traits;
pub use impl_traits::*;

pub mod prelude;
