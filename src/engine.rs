//! Scan driver tying sampling, state machines and dispatch together.
//!
//! Provides [`KeyEngine`], the single entry point the platform calls once per
//! scan period.

use crate::config::{DispatchMode, KeyConfig, Timing};
use crate::dispatch::{CallbackTarget, Dispatcher, EventCallback};
use crate::hardkey::{HardKey, KeyReader};
use crate::queue::{EventQueue, EventSink};
use crate::softkey::{KeyState, SoftKey};
use crate::types::{ConfigError, HardKeyId, KeyEvent, SoftKeyId};
use heapless::Vec;

/// Debounces hard keys and turns them into soft key events.
///
/// Call [`scan`](Self::scan) at a fixed period, from a timer interrupt, a
/// dedicated task or a main-loop tick check. Each call does one tick of work:
/// every hard key is sampled first, then every soft key is advanced in table
/// order, so events from the same tick come out in table order.
///
/// # Type Parameters
/// * `R` - Pin reader
/// * `S` - Event sink, usually an [`EventQueue`] or an [`EventProducer`](crate::EventProducer)
/// * `HK` - Maximum number of hard keys
/// * `SK` - Maximum number of soft keys
pub struct KeyEngine<R: KeyReader, S: EventSink, const HK: usize, const SK: usize> {
    reader: R,
    sink: S,
    hard_keys: Vec<HardKey, HK>,
    soft_keys: Vec<SoftKey, SK>,
    timing: Timing,
    dispatcher: Dispatcher<SK>,
    tick: u32,
}

impl<R: KeyReader, S: EventSink, const HK: usize, const SK: usize> KeyEngine<R, S, HK, SK> {
    /// Creates an engine with every key released and idle.
    pub fn new(config: KeyConfig<HK, SK>, reader: R, sink: S) -> Self {
        let timing = *config.timing();

        let mut hard_keys = Vec::new();
        for key in config.hard_keys() {
            // Same capacity as the config table
            let _ = hard_keys.push(HardKey::new(*key, timing.debounce_ticks));
        }

        let mut soft_keys = Vec::new();
        for key in config.soft_keys() {
            let _ = soft_keys.push(SoftKey::new(*key));
        }

        debug!(
            "key engine ready: {} hard keys, {} soft keys",
            hard_keys.len(),
            soft_keys.len()
        );

        Self {
            reader,
            sink,
            hard_keys,
            soft_keys,
            timing,
            dispatcher: Dispatcher::new(config.dispatch()),
            tick: 0,
        }
    }

    /// Runs one scan tick.
    pub fn scan(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        for (idx, key) in self.hard_keys.iter_mut().enumerate() {
            let id = HardKeyId(idx as u8);
            if key.sample(self.reader.read(id)) {
                trace!("hard key {} active={} at tick {}", id.0, key.is_active(), self.tick);
            }
        }

        for (idx, key) in self.soft_keys.iter_mut().enumerate() {
            let active = key.is_active_in(&self.hard_keys);
            for kind in key.update(active, &self.timing) {
                let event = KeyEvent::new(key.id(), kind, self.tick);
                self.dispatcher.dispatch(idx, event, &mut self.sink);
            }
        }
    }

    /// Registers a callback for one soft key or for all of them.
    ///
    /// Callbacks only run when the dispatch mode is `Callback` or `CallbackAndQueue`.
    ///
    /// # Errors
    /// * `UnknownSoftKey` - No soft key has this id
    pub fn register_callback(
        &mut self,
        target: CallbackTarget,
        callback: EventCallback,
    ) -> Result<(), ConfigError> {
        let index = self.target_index(target)?;
        self.dispatcher.set(index, Some(callback));
        Ok(())
    }

    /// Removes a previously registered callback.
    ///
    /// # Errors
    /// * `UnknownSoftKey` - No soft key has this id
    pub fn clear_callback(&mut self, target: CallbackTarget) -> Result<(), ConfigError> {
        let index = self.target_index(target)?;
        self.dispatcher.set(index, None);
        Ok(())
    }

    /// Returns every key to released/idle and restarts the tick count.
    ///
    /// Events already handed to the sink are kept. Callbacks stay registered.
    pub fn reset(&mut self) {
        for key in self.hard_keys.iter_mut() {
            key.reset();
        }
        for key in self.soft_keys.iter_mut() {
            key.reset();
        }
        self.tick = 0;
        debug!("key engine reset");
    }

    /// Ticks scanned so far. Wraps on overflow.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Debounced level of a hard key, or `None` if it does not exist.
    pub fn is_hard_key_active(&self, id: HardKeyId) -> Option<bool> {
        self.hard_keys.get(usize::from(id)).map(HardKey::is_active)
    }

    /// State of a soft key, or `None` if it does not exist.
    pub fn soft_key_state(&self, id: SoftKeyId) -> Option<KeyState> {
        self.soft_keys
            .iter()
            .find(|key| key.id() == id)
            .map(SoftKey::state)
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.dispatcher.mode()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Stops the engine, giving back the reader and the sink.
    pub fn release(self) -> (R, S) {
        (self.reader, self.sink)
    }

    fn target_index(&self, target: CallbackTarget) -> Result<Option<usize>, ConfigError> {
        match target {
            CallbackTarget::All => Ok(None),
            CallbackTarget::Key(id) => self
                .soft_keys
                .iter()
                .position(|key| key.id() == id)
                .map(Some)
                .ok_or(ConfigError::UnknownSoftKey(id)),
        }
    }
}

impl<R: KeyReader, const Q: usize, const HK: usize, const SK: usize> KeyEngine<R, EventQueue<Q>, HK, SK> {
    /// Takes the oldest queued event.
    pub fn fetch_event(&mut self) -> Option<KeyEvent> {
        self.sink.pop()
    }

    /// Events dropped because the queue was full.
    pub fn dropped_events(&self) -> u32 {
        self.sink.dropped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HardKeyConfig;
    use crate::types::EventKind;

    type Engine<R> = KeyEngine<R, EventQueue<16>, 2, 2>;

    fn config() -> KeyConfig<2, 2> {
        KeyConfig::builder()
            .hard_key(HardKeyConfig::active_high().with_debounce(0))
            .unwrap()
            .hard_key(HardKeyConfig::active_high().with_debounce(0))
            .unwrap()
            .normal_key(SoftKeyId(10), HardKeyId(0))
            .unwrap()
            .normal_key(SoftKeyId(20), HardKeyId(1))
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn first_scan_is_tick_one() {
        let mut engine: Engine<_> = KeyEngine::new(config(), |_: HardKeyId| false, EventQueue::new());
        assert_eq!(engine.tick(), 0);
        engine.scan();
        assert_eq!(engine.tick(), 1);
        assert_eq!(engine.fetch_event(), None);
    }

    #[test]
    fn same_tick_events_follow_table_order() {
        let mut engine: Engine<_> = KeyEngine::new(config(), |_: HardKeyId| true, EventQueue::new());
        engine.scan();

        assert_eq!(
            engine.fetch_event(),
            Some(KeyEvent::new(SoftKeyId(10), EventKind::PressDown, 1))
        );
        assert_eq!(
            engine.fetch_event(),
            Some(KeyEvent::new(SoftKeyId(20), EventKind::PressDown, 1))
        );
    }

    #[test]
    fn introspection_reports_levels_and_states() {
        let mut engine: Engine<_> =
            KeyEngine::new(config(), |id: HardKeyId| id.0 == 1, EventQueue::new());
        engine.scan();

        assert_eq!(engine.is_hard_key_active(HardKeyId(0)), Some(false));
        assert_eq!(engine.is_hard_key_active(HardKeyId(1)), Some(true));
        assert_eq!(engine.is_hard_key_active(HardKeyId(2)), None);
        assert_eq!(engine.soft_key_state(SoftKeyId(10)), Some(KeyState::Idle));
        assert_eq!(engine.soft_key_state(SoftKeyId(20)), Some(KeyState::PressDown));
        assert_eq!(engine.soft_key_state(SoftKeyId(30)), None);
    }

    #[test]
    fn reset_clears_keys_but_keeps_queue() {
        let mut engine: Engine<_> = KeyEngine::new(config(), |_: HardKeyId| true, EventQueue::new());
        engine.scan();
        engine.reset();

        assert_eq!(engine.tick(), 0);
        assert_eq!(engine.is_hard_key_active(HardKeyId(0)), Some(false));
        assert_eq!(engine.soft_key_state(SoftKeyId(10)), Some(KeyState::Idle));
        assert_eq!(engine.sink().len(), 2);
    }

    #[test]
    fn unknown_callback_target_is_rejected() {
        fn ignore(_: KeyEvent) {}

        let mut engine: Engine<_> = KeyEngine::new(config(), |_: HardKeyId| false, EventQueue::new());
        assert_eq!(
            engine.register_callback(CallbackTarget::Key(SoftKeyId(99)), ignore),
            Err(ConfigError::UnknownSoftKey(SoftKeyId(99)))
        );
        assert!(engine.register_callback(CallbackTarget::Key(SoftKeyId(20)), ignore).is_ok());
        assert!(engine.register_callback(CallbackTarget::All, ignore).is_ok());
        assert!(engine.clear_callback(CallbackTarget::Key(SoftKeyId(20))).is_ok());
    }
}
