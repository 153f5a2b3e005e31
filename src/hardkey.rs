//! Physical key sampling and debouncing.
//!
//! Provides the [`KeyReader`] capability the engine samples pins through, a
//! [`PinReader`] adapter for `embedded-hal` input pins, and the per-key
//! [`HardKey`] counter debouncer.

use crate::config::HardKeyConfig;
use crate::types::{HardKeyId, Level};
use embedded_hal::digital::InputPin;

/// Trait for reading raw pin levels.
///
/// Called once per hard key per scan tick. Must not block. Implementations
/// that can fail should report a sensible fallback level rather than stall.
pub trait KeyReader {
    /// Returns true if the pin backing `key` currently reads high.
    fn read(&mut self, key: HardKeyId) -> bool;
}

impl<F> KeyReader for F
where
    F: FnMut(HardKeyId) -> bool,
{
    fn read(&mut self, key: HardKeyId) -> bool {
        self(key)
    }
}

/// Reads hard keys from an array of `embedded-hal` input pins.
///
/// Hard key `n` maps to `pins[n]`. A pin that returns an error, or a key
/// with no pin, reports the last level successfully read from it. Before the
/// first successful read that is high, the idle level of a pulled-up key.
pub struct PinReader<P: InputPin, const N: usize> {
    pins: [P; N],
    last: [bool; N],
}

impl<P: InputPin, const N: usize> PinReader<P, N> {
    /// Wraps `pins`, with `pins[n]` backing hard key `n`.
    pub fn new(pins: [P; N]) -> Self {
        Self {
            pins,
            last: [true; N],
        }
    }

    /// Gives the pins back.
    pub fn release(self) -> [P; N] {
        self.pins
    }
}

impl<P: InputPin, const N: usize> KeyReader for PinReader<P, N> {
    fn read(&mut self, key: HardKeyId) -> bool {
        let idx = usize::from(key);
        let Some(pin) = self.pins.get_mut(idx) else {
            warn!("no pin for hard key {}", key.0);
            return true;
        };

        match pin.is_high() {
            Ok(high) => {
                self.last[idx] = high;
                high
            }
            Err(_) => {
                warn!("pin read failed for hard key {}, reusing last level", key.0);
                self.last[idx]
            }
        }
    }
}

/// Debounce state of one physical key.
///
/// The reported level only changes after `filter` consecutive raw samples
/// disagree with it. Any agreeing sample resets the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardKey {
    idle: Level,
    filter: u8,
    active: bool,
    count: u8,
}

impl HardKey {
    /// Creates a released key. `default_filter` applies when the config has no override.
    pub fn new(config: HardKeyConfig, default_filter: u8) -> Self {
        Self {
            idle: config.idle,
            filter: config.debounce_ticks.unwrap_or(default_filter),
            active: false,
            count: 0,
        }
    }

    /// Feeds one raw sample. Returns true if the debounced level flipped.
    pub fn sample(&mut self, raw_high: bool) -> bool {
        let candidate = raw_high != self.idle.is_high();

        if candidate == self.active {
            self.count = 0;
            return false;
        }

        self.count = self.count.saturating_add(1);
        // A filter of zero trusts every sample
        if self.count >= self.filter.max(1) {
            self.active = candidate;
            self.count = 0;
            return true;
        }
        false
    }

    /// Debounced level: true while the key is pressed.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Level the pin reads when released.
    pub fn idle_level(&self) -> Level {
        self.idle
    }

    /// Debounce length in ticks.
    pub fn filter(&self) -> u8 {
        self.filter
    }

    /// Forces the key back to released with no pending samples.
    pub fn reset(&mut self) {
        self.active = false;
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{Error, ErrorKind, ErrorType};

    fn feed(key: &mut HardKey, samples: &[bool]) -> heapless::Vec<bool, 32> {
        let mut levels = heapless::Vec::new();
        for &raw in samples {
            key.sample(raw);
            levels.push(key.is_active()).unwrap();
        }
        levels
    }

    #[test]
    fn active_low_key_needs_filter_consecutive_samples() {
        let mut key = HardKey::new(HardKeyConfig::active_low(), 3);
        let levels = feed(&mut key, &[true, false, false, false, false]);
        assert_eq!(levels.as_slice(), &[false, false, false, true, true]);
    }

    #[test]
    fn glitch_shorter_than_filter_is_ignored() {
        let mut key = HardKey::new(HardKeyConfig::active_high(), 3);
        let levels = feed(&mut key, &[true, true, false, true, true, false, false]);
        assert!(levels.iter().all(|&active| !active));
    }

    #[test]
    fn release_is_debounced_too() {
        let mut key = HardKey::new(HardKeyConfig::active_high(), 2);
        feed(&mut key, &[true, true]);
        assert!(key.is_active());

        let levels = feed(&mut key, &[false, true, false, false]);
        assert_eq!(levels.as_slice(), &[true, true, true, false]);
    }

    #[test]
    fn zero_filter_trusts_every_sample() {
        let mut key = HardKey::new(HardKeyConfig::active_high().with_debounce(0), 4);
        assert_eq!(key.filter(), 0);
        assert!(key.sample(true));
        assert!(key.is_active());
        assert!(key.sample(false));
        assert!(!key.is_active());
    }

    #[test]
    fn per_key_override_wins_over_default() {
        let key = HardKey::new(HardKeyConfig::active_low().with_debounce(7), 2);
        assert_eq!(key.filter(), 7);
        assert_eq!(key.idle_level(), Level::High);
    }

    #[test]
    fn reset_clears_level_and_count() {
        let mut key = HardKey::new(HardKeyConfig::active_high(), 2);
        feed(&mut key, &[true, true, false]);
        key.reset();
        assert!(!key.is_active());
        // One sample is not enough after reset
        assert!(!key.sample(true));
    }

    #[test]
    fn closures_are_readers() {
        let mut reader = |key: HardKeyId| key.0 == 1;
        assert!(!reader.read(HardKeyId(0)));
        assert!(reader.read(HardKeyId(1)));
    }

    #[derive(Debug)]
    struct PinFault;

    impl Error for PinFault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct FlakyPin {
        results: heapless::Deque<Result<bool, ()>, 8>,
    }

    impl ErrorType for FlakyPin {
        type Error = PinFault;
    }

    impl InputPin for FlakyPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            match self.results.pop_front() {
                Some(Ok(level)) => Ok(level),
                _ => Err(PinFault),
            }
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    #[test]
    fn pin_reader_falls_back_to_last_good_level() {
        let mut results = heapless::Deque::new();
        results.push_back(Ok(false)).unwrap();
        results.push_back(Err(())).unwrap();
        let mut reader = PinReader::new([FlakyPin { results }]);

        assert!(!reader.read(HardKeyId(0)));
        assert!(!reader.read(HardKeyId(0)));
        // Missing pins read as idle high
        assert!(reader.read(HardKeyId(5)));
    }

    struct FixedPin(bool);

    impl ErrorType for FixedPin {
        type Error = Infallible;
    }

    impl InputPin for FixedPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0)
        }
    }

    #[test]
    fn pin_reader_maps_ids_to_pins() {
        let mut reader = PinReader::new([FixedPin(true), FixedPin(false)]);
        assert!(reader.read(HardKeyId(0)));
        assert!(!reader.read(HardKeyId(1)));
        let pins = reader.release();
        assert_eq!(pins.len(), 2);
    }
}
