//! Logging shims.
//!
//! Forwards to `defmt` when the `defmt` feature is enabled, otherwise to `log`
//! when the `log` feature is enabled. With neither, the macros expand to nothing
//! and their arguments are not evaluated.
//!
//! Declared with `#[macro_use]` ahead of every other module in the crate root.
//!
//! Only `{}` and `{:?}` placeholders are valid here, since the same format string
//! has to be accepted by both backends.

#![allow(unused_macros)]

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::trace!($($arg)*);
        #[cfg(all(feature = "log", not(feature = "defmt")))]
        log::trace!($($arg)*);
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
        #[cfg(all(feature = "log", not(feature = "defmt")))]
        log::debug!($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
        #[cfg(all(feature = "log", not(feature = "defmt")))]
        log::warn!($($arg)*);
    }};
}
