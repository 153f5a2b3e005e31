//! Conversion between wall-clock durations and scan ticks.
//!
//! The engine itself only counts ticks. These helpers let thresholds be written
//! in whatever duration type the platform uses.

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy {
    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;
}

/// The fixed interval at which [`KeyEngine::scan`](crate::KeyEngine::scan) is called.
#[derive(Debug, Clone, Copy)]
pub struct ScanPeriod<D: TimeDuration> {
    period: D,
}

impl<D: TimeDuration> ScanPeriod<D> {
    /// Creates a scan period.
    pub fn new(period: D) -> Self {
        Self { period }
    }

    /// Returns the scan period.
    pub fn period(&self) -> D {
        self.period
    }

    /// Number of ticks needed to cover `duration`, rounded up.
    ///
    /// Saturates at `u16::MAX`. A zero-length period is treated as one millisecond.
    pub fn ticks(&self, duration: D) -> u16 {
        let period = self.period.as_millis().max(1);
        let ticks = duration.as_millis().div_ceil(period);
        u16::try_from(ticks).unwrap_or(u16::MAX)
    }

    /// Like [`ticks`](Self::ticks), saturating at `u8::MAX` for debounce lengths.
    pub fn debounce_ticks(&self, duration: D) -> u8 {
        u8::try_from(self.ticks(duration)).unwrap_or(u8::MAX)
    }
}
