use embassy_time::Instant;

use crate::MicrosClock;

/// [`MicrosClock`] backed by the embassy time driver.
/// The 64 bit instant is truncated, the sequencer handles the wraparound.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MicrosClock for EmbassyClock {
    fn now_micros(&mut self) -> u32 {
        Instant::now().as_micros() as u32
    }
}

impl<T: MicrosClock + ?Sized> MicrosClock for &mut T {
    fn now_micros(&mut self) -> u32 {
        (**self).now_micros()
    }
}
