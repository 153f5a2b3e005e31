#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`HardKey`**: One physical pin, debounced by a consecutive-sample counter
//! - **`SoftKey`**: One logical button, following a single hard key or a two-key combo
//! - **`KeyState`**: Where a soft key is in its `Idle` / `PressDown` / `LongPress` / `PressBreak` cycle
//! - **`KeyEvent`**: A soft key id, an `EventKind` and the tick it happened on
//! - **`EventQueue`**: Lock-free single-producer/single-consumer ring buffer of events
//! - **`KeyEngine`**: Owns the key tables and runs one tick per `scan()` call
//! - **`KeyReader`**: Trait to implement for your pin hardware (or use `PinReader`)
//! - **`KeyConfig`**: Validated key tables, `Timing` thresholds and `DispatchMode`
//!
//! All thresholds are counted in scan ticks. Use `ScanPeriod` to convert from
//! your platform's duration type.

#[macro_use]
mod logging;

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod hardkey;
pub mod queue;
pub mod softkey;
pub mod time;
pub mod types;

pub use config::{
    DispatchMode, HardKeyConfig, KeyConfig, KeyConfigBuilder, SoftKeyConfig, SoftKeyKind, Timing,
};
pub use dispatch::{CallbackTarget, EventCallback};
pub use engine::KeyEngine;
pub use hardkey::{HardKey, KeyReader, PinReader};
pub use queue::{EventConsumer, EventProducer, EventQueue, EventSink};
pub use softkey::{KeyState, SoftKey};
pub use time::{ScanPeriod, TimeDuration};
pub use types::{ConfigError, EventKind, HardKeyId, KeyEvent, Level, SoftKeyId};
