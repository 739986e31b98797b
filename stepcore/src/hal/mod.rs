//! [`crate::PinDriver`] implementations on top of `embedded-hal` traits.

mod h_bridge;
pub use h_bridge::*;
