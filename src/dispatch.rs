//! Routing of produced events to callbacks and the event sink.

use crate::config::DispatchMode;
use crate::queue::EventSink;
use crate::types::{KeyEvent, SoftKeyId};

/// Callback invoked synchronously from the scan context.
///
/// Runs inside [`KeyEngine::scan`](crate::KeyEngine::scan), possibly in an
/// interrupt handler. It must not block and must not call back into the engine.
pub type EventCallback = fn(KeyEvent);

/// Which soft keys a callback applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallbackTarget {
    /// Every soft key.
    All,

    /// One soft key.
    Key(SoftKeyId),
}

/// Callback table. Per-key slots are indexed like the soft key table.
#[derive(Debug)]
pub(crate) struct Dispatcher<const SK: usize> {
    mode: DispatchMode,
    global: Option<EventCallback>,
    per_key: [Option<EventCallback>; SK],
}

impl<const SK: usize> Dispatcher<SK> {
    pub(crate) fn new(mode: DispatchMode) -> Self {
        Self {
            mode,
            global: None,
            per_key: [None; SK],
        }
    }

    pub(crate) fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Sets or clears the callback for `index`, or the global one when `index` is `None`.
    pub(crate) fn set(&mut self, index: Option<usize>, callback: Option<EventCallback>) {
        match index {
            None => self.global = callback,
            Some(idx) => {
                if let Some(slot) = self.per_key.get_mut(idx) {
                    *slot = callback;
                }
            }
        }
    }

    /// Delivers `event`, produced by the soft key at `index`.
    ///
    /// Returns false only if the event was offered to the sink and dropped.
    pub(crate) fn dispatch<S: EventSink>(&self, index: usize, event: KeyEvent, sink: &mut S) -> bool {
        debug!("event {:?} from soft key {} at tick {}", event.kind, event.key.0, event.tick);

        let handled = match self.mode {
            DispatchMode::Queue => false,
            DispatchMode::Callback | DispatchMode::CallbackAndQueue => self.invoke(index, event),
        };

        match self.mode {
            DispatchMode::Callback if handled => true,
            _ => sink.push(event),
        }
    }

    /// Runs the key's callback then the global one. Returns true if any ran.
    fn invoke(&self, index: usize, event: KeyEvent) -> bool {
        let mut handled = false;
        if let Some(callback) = self.per_key.get(index).copied().flatten() {
            callback(event);
            handled = true;
        }
        if let Some(callback) = self.global {
            callback(event);
            handled = true;
        }
        handled
    }
}
