//! Core identifiers, events and errors.

/// Index of a physical key in the hard key table.
///
/// Hard key ids are assigned in the order keys are added to the
/// [`KeyConfigBuilder`](crate::KeyConfigBuilder), starting at zero. The same id
/// is passed to the [`KeyReader`](crate::KeyReader) when the pin is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HardKeyId(pub u8);

impl From<u8> for HardKeyId {
    fn from(id: u8) -> Self {
        HardKeyId(id)
    }
}

impl From<HardKeyId> for usize {
    fn from(id: HardKeyId) -> Self {
        id.0 as usize
    }
}

/// Identifier of a logical button, chosen by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftKeyId(pub u8);

impl From<u8> for SoftKeyId {
    fn from(id: u8) -> Self {
        SoftKeyId(id)
    }
}

/// Electrical level of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Pin reads low.
    Low,

    /// Pin reads high.
    High,
}

impl Level {
    /// Returns true for [`Level::High`].
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// Kind of a semantic button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// Key went down.
    PressDown,

    /// Key went up.
    Release,

    /// Key has been held past the long-press threshold.
    LongPressStart,

    /// Key is still held after a long press. Repeats while held.
    LongPressHold,

    /// A single short press with no follow-up inside the double-click window.
    Click,

    /// Two short presses inside the double-click window.
    DoubleClick,
}

/// A single button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    /// Soft key that produced the event.
    pub key: SoftKeyId,

    /// What happened.
    pub kind: EventKind,

    /// Scan tick the event was produced on. Wraps on overflow.
    pub tick: u32,
}

impl KeyEvent {
    /// Creates a new event.
    #[inline]
    pub const fn new(key: SoftKeyId, kind: EventKind, tick: u32) -> Self {
        Self { key, kind, tick }
    }
}

/// Configuration errors, reported once when the engine is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No hard keys were configured.
    NoHardKeys,

    /// No soft keys were configured.
    NoSoftKeys,

    /// A table is full.
    CapacityExceeded {
        /// Which table overflowed, `"hard key"` or `"soft key"`.
        table: &'static str,
        /// Fixed capacity of that table.
        capacity: usize,
    },

    /// A soft key references a hard key that does not exist.
    HardKeyOutOfRange { key: SoftKeyId, hard_key: HardKeyId },

    /// A combo key references the same hard key twice.
    ComboSameHardKey(SoftKeyId),

    /// Two soft keys share the same id.
    DuplicateSoftKey(SoftKeyId),

    /// A threshold that must be non-zero is zero.
    ZeroThreshold {
        /// Name of the offending `Timing` field.
        name: &'static str,
    },

    /// No soft key with this id exists.
    UnknownSoftKey(SoftKeyId),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NoHardKeys => write!(f, "at least one hard key is required"),
            ConfigError::NoSoftKeys => write!(f, "at least one soft key is required"),
            ConfigError::CapacityExceeded { table, capacity } => {
                write!(f, "{} table is full (capacity {})", table, capacity)
            }
            ConfigError::HardKeyOutOfRange { key, hard_key } => {
                write!(
                    f,
                    "soft key {} references hard key {} which does not exist",
                    key.0, hard_key.0
                )
            }
            ConfigError::ComboSameHardKey(key) => {
                write!(f, "combo key {} references the same hard key twice", key.0)
            }
            ConfigError::DuplicateSoftKey(key) => {
                write!(f, "soft key id {} is used more than once", key.0)
            }
            ConfigError::ZeroThreshold { name } => {
                write!(f, "{} must be greater than zero", name)
            }
            ConfigError::UnknownSoftKey(key) => {
                write!(f, "soft key {} does not exist", key.0)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
