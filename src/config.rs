//! Engine configuration: timing thresholds, key tables and dispatch mode.

use crate::types::{ConfigError, HardKeyId, Level, SoftKeyId};
use heapless::Vec;

/// Tick thresholds and feature toggles.
///
/// All values are in scan ticks. Use [`ScanPeriod`](crate::ScanPeriod) to derive
/// them from durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Consecutive differing samples needed to flip a hard key. Overridable per key.
    pub debounce_ticks: u8,

    /// Ticks a key must stay down, counting the press tick, to get `LongPressStart`.
    pub long_press_start_ticks: u16,

    /// Ticks between `LongPressStart` and the first `LongPressHold`, and between
    /// holds when repeat is disabled.
    pub long_press_hold_ticks: u16,

    /// Ticks after a release during which a second press makes a double click.
    /// Zero disables double-click detection.
    pub double_click_ticks: u16,

    /// Ticks between holds after the first one, when repeat is enabled.
    pub repeat_ticks: u16,

    /// Emit `LongPressHold` events.
    pub enable_long_hold: bool,

    /// Use `repeat_ticks` for holds after the first.
    pub enable_repeat: bool,
}

impl Timing {
    /// Defaults tuned for a 10 ms scan period.
    pub const DEFAULT: Self = Self {
        debounce_ticks: 2,
        long_press_start_ticks: 100,
        long_press_hold_ticks: 50,
        double_click_ticks: 30,
        repeat_ticks: 10,
        enable_long_hold: true,
        enable_repeat: false,
    };

    /// Sets the default debounce length for hard keys without an override.
    pub const fn with_debounce_ticks(mut self, ticks: u8) -> Self {
        self.debounce_ticks = ticks;
        self
    }

    /// Sets the held ticks, press tick included, before `LongPressStart`.
    pub const fn with_long_press_start_ticks(mut self, ticks: u16) -> Self {
        self.long_press_start_ticks = ticks;
        self
    }

    /// Sets the ticks from `LongPressStart` to the first `LongPressHold`.
    pub const fn with_long_press_hold_ticks(mut self, ticks: u16) -> Self {
        self.long_press_hold_ticks = ticks;
        self
    }

    /// Sets the double-click window. Zero disables double-click detection.
    pub const fn with_double_click_ticks(mut self, ticks: u16) -> Self {
        self.double_click_ticks = ticks;
        self
    }

    /// Sets the repeat interval and enables repeat.
    pub const fn with_repeat_ticks(mut self, ticks: u16) -> Self {
        self.repeat_ticks = ticks;
        self.enable_repeat = true;
        self
    }

    /// Enables or disables `LongPressHold` events.
    pub const fn with_long_hold(mut self, enabled: bool) -> Self {
        self.enable_long_hold = enabled;
        self
    }

    /// Enables or disables the `repeat_ticks` interval for later holds.
    pub const fn with_repeat(mut self, enabled: bool) -> Self {
        self.enable_repeat = enabled;
        self
    }

    /// Returns true when double-click detection is on.
    #[inline]
    pub const fn double_click_enabled(&self) -> bool {
        self.double_click_ticks > 0
    }

    /// Interval before the next `LongPressHold`, given how many were already sent.
    #[inline]
    pub(crate) const fn hold_interval(&self, holds_sent: u16) -> u16 {
        if holds_sent > 0 && self.enable_repeat {
            self.repeat_ticks
        } else {
            self.long_press_hold_ticks
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.long_press_start_ticks == 0 {
            return Err(ConfigError::ZeroThreshold {
                name: "long_press_start_ticks",
            });
        }
        if self.enable_long_hold && self.long_press_hold_ticks == 0 {
            return Err(ConfigError::ZeroThreshold {
                name: "long_press_hold_ticks",
            });
        }
        if self.enable_long_hold && self.enable_repeat && self.repeat_ticks == 0 {
            return Err(ConfigError::ZeroThreshold {
                name: "repeat_ticks",
            });
        }
        Ok(())
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Static description of one physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HardKeyConfig {
    /// Level the pin sits at when the key is not pressed.
    pub idle: Level,

    /// Per-key debounce length. `None` uses [`Timing::debounce_ticks`].
    pub debounce_ticks: Option<u8>,
}

impl HardKeyConfig {
    /// Key with a pull-up that reads low when pressed.
    pub const fn active_low() -> Self {
        Self {
            idle: Level::High,
            debounce_ticks: None,
        }
    }

    /// Key with a pull-down that reads high when pressed.
    pub const fn active_high() -> Self {
        Self {
            idle: Level::Low,
            debounce_ticks: None,
        }
    }

    /// Overrides the debounce length for this key.
    pub const fn with_debounce(mut self, ticks: u8) -> Self {
        self.debounce_ticks = Some(ticks);
        self
    }
}

/// Which hard keys drive a soft key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoftKeyKind {
    /// Follows a single hard key.
    Normal(HardKeyId),

    /// Active only while both hard keys are active. Releasing either one
    /// ends the press at once, so combos never click.
    Combo(HardKeyId, HardKeyId),
}

impl SoftKeyKind {
    fn hard_keys(&self) -> (HardKeyId, Option<HardKeyId>) {
        match *self {
            SoftKeyKind::Normal(a) => (a, None),
            SoftKeyKind::Combo(a, b) => (a, Some(b)),
        }
    }
}

/// Static description of one logical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftKeyConfig {
    pub id: SoftKeyId,
    pub kind: SoftKeyKind,
}

/// Where produced events go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchMode {
    /// Events go to the sink only. Registered callbacks are not called.
    #[default]
    Queue,

    /// Events go to callbacks instead of the sink. Events with no callback
    /// still reach the sink.
    Callback,

    /// Callbacks run first, then the event is pushed to the sink.
    CallbackAndQueue,
}

/// Validated engine configuration.
///
/// Can only be obtained from [`KeyConfigBuilder::build`], so every key reference
/// inside is known to be in range.
///
/// # Type Parameters
/// * `HK` - Maximum number of hard keys
/// * `SK` - Maximum number of soft keys
#[derive(Debug, Clone)]
pub struct KeyConfig<const HK: usize, const SK: usize> {
    hard_keys: Vec<HardKeyConfig, HK>,
    soft_keys: Vec<SoftKeyConfig, SK>,
    timing: Timing,
    dispatch: DispatchMode,
}

impl<const HK: usize, const SK: usize> KeyConfig<HK, SK> {
    /// Creates a new configuration builder.
    pub fn builder() -> KeyConfigBuilder<HK, SK> {
        KeyConfigBuilder::new()
    }

    pub fn hard_keys(&self) -> &[HardKeyConfig] {
        &self.hard_keys
    }

    pub fn soft_keys(&self) -> &[SoftKeyConfig] {
        &self.soft_keys
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn dispatch(&self) -> DispatchMode {
        self.dispatch
    }
}

/// Builder for a validated [`KeyConfig`].
#[derive(Debug)]
pub struct KeyConfigBuilder<const HK: usize, const SK: usize> {
    hard_keys: Vec<HardKeyConfig, HK>,
    soft_keys: Vec<SoftKeyConfig, SK>,
    timing: Timing,
    dispatch: DispatchMode,
}

impl<const HK: usize, const SK: usize> KeyConfigBuilder<HK, SK> {
    /// Creates an empty builder with default timing and queue-only dispatch.
    pub fn new() -> Self {
        Self {
            hard_keys: Vec::new(),
            soft_keys: Vec::new(),
            timing: Timing::DEFAULT,
            dispatch: DispatchMode::Queue,
        }
    }

    /// Appends a hard key. Its id is the number of hard keys added before it.
    ///
    /// # Errors
    /// * `CapacityExceeded` - Already `HK` hard keys
    pub fn hard_key(mut self, key: HardKeyConfig) -> Result<Self, ConfigError> {
        // Ids are u8
        if self.hard_keys.len() > usize::from(u8::MAX) {
            return Err(ConfigError::CapacityExceeded {
                table: "hard key",
                capacity: usize::from(u8::MAX) + 1,
            });
        }
        self.hard_keys
            .push(key)
            .map_err(|_| ConfigError::CapacityExceeded {
                table: "hard key",
                capacity: HK,
            })?;
        Ok(self)
    }

    /// Appends a soft key following a single hard key.
    ///
    /// # Errors
    /// * `CapacityExceeded` - Already `SK` soft keys
    pub fn normal_key(self, id: SoftKeyId, hard_key: HardKeyId) -> Result<Self, ConfigError> {
        self.soft_key(SoftKeyConfig {
            id,
            kind: SoftKeyKind::Normal(hard_key),
        })
    }

    /// Appends a soft key active only while both hard keys are active.
    ///
    /// # Errors
    /// * `CapacityExceeded` - Already `SK` soft keys
    pub fn combo_key(
        self,
        id: SoftKeyId,
        first: HardKeyId,
        second: HardKeyId,
    ) -> Result<Self, ConfigError> {
        self.soft_key(SoftKeyConfig {
            id,
            kind: SoftKeyKind::Combo(first, second),
        })
    }

    /// Appends a soft key.
    ///
    /// Soft keys are evaluated in the order they are added.
    ///
    /// # Errors
    /// * `CapacityExceeded` - Already `SK` soft keys
    pub fn soft_key(mut self, key: SoftKeyConfig) -> Result<Self, ConfigError> {
        self.soft_keys
            .push(key)
            .map_err(|_| ConfigError::CapacityExceeded {
                table: "soft key",
                capacity: SK,
            })?;
        Ok(self)
    }

    /// Sets the tick thresholds.
    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Sets how events are delivered.
    pub fn dispatch(mut self, mode: DispatchMode) -> Self {
        self.dispatch = mode;
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    /// * `NoHardKeys` / `NoSoftKeys` - A table is empty
    /// * `HardKeyOutOfRange` - A soft key references a missing hard key
    /// * `ComboSameHardKey` - A combo uses one hard key for both halves
    /// * `DuplicateSoftKey` - Two soft keys share an id
    /// * `ZeroThreshold` - A required threshold is zero
    pub fn build(self) -> Result<KeyConfig<HK, SK>, ConfigError> {
        if self.hard_keys.is_empty() {
            return Err(ConfigError::NoHardKeys);
        }
        if self.soft_keys.is_empty() {
            return Err(ConfigError::NoSoftKeys);
        }

        for (idx, key) in self.soft_keys.iter().enumerate() {
            let (first, second) = key.kind.hard_keys();
            for hard_key in core::iter::once(first).chain(second) {
                if usize::from(hard_key) >= self.hard_keys.len() {
                    return Err(ConfigError::HardKeyOutOfRange {
                        key: key.id,
                        hard_key,
                    });
                }
            }
            if second == Some(first) {
                return Err(ConfigError::ComboSameHardKey(key.id));
            }
            if self.soft_keys[..idx].iter().any(|other| other.id == key.id) {
                return Err(ConfigError::DuplicateSoftKey(key.id));
            }
        }

        self.timing.validate()?;

        Ok(KeyConfig {
            hard_keys: self.hard_keys,
            soft_keys: self.soft_keys,
            timing: self.timing,
            dispatch: self.dispatch,
        })
    }
}

impl<const HK: usize, const SK: usize> Default for KeyConfigBuilder<HK, SK> {
    fn default() -> Self {
        Self::new()
    }
}
