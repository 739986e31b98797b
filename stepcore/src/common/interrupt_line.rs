use core::sync::atomic::Ordering;

use portable_atomic::AtomicBool;

/// Cooperative stop request for [`crate::common::motor::Stepper::run_until_done`].
///
/// Can live in a `static` and be raised from an interrupt handler or another task,
/// the run loop checks it before every poll.
pub struct InterruptLine {
    raised: AtomicBool,
}

impl InterruptLine {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }
    /// re-arm the line
    pub fn clear(&self) {
        self.raised.store(false, Ordering::Release);
    }
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

impl Default for InterruptLine {
    fn default() -> Self {
        Self::new()
    }
}
