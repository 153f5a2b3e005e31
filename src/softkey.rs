//! Per-button state machine.
//!
//! Each [`SoftKey`] turns a debounced active/inactive signal into press,
//! release, long-press, click and double-click events. Timing is counted in
//! scan ticks only.

use crate::config::{SoftKeyConfig, SoftKeyKind, Timing};
use crate::hardkey::HardKey;
use crate::types::{EventKind, HardKeyId, SoftKeyId};
use heapless::Vec;

/// Events produced by one soft key on one tick. Never more than three.
pub type TickEvents = Vec<EventKind, 3>;

/// The current state of a soft key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyState {
    /// Released, nothing pending.
    Idle,
    /// Held, below the long-press threshold.
    PressDown,
    /// Held past the long-press threshold.
    LongPress,
    /// Released after a short press, waiting to see if a second press follows.
    PressBreak,
}

/// State machine for one logical button.
#[derive(Debug, Clone, Copy)]
pub struct SoftKey {
    id: SoftKeyId,
    kind: SoftKeyKind,
    state: KeyState,
    /// Held ticks in `PressDown`, otherwise ticks since the state (or last hold) began.
    ticks: u16,
    /// Short presses in the current click sequence.
    clicks: u8,
    /// `LongPressHold` events sent during the current long press.
    holds: u16,
}

impl SoftKey {
    /// Creates an idle soft key.
    pub fn new(config: SoftKeyConfig) -> Self {
        Self {
            id: config.id,
            kind: config.kind,
            state: KeyState::Idle,
            ticks: 0,
            clicks: 0,
            holds: 0,
        }
    }

    pub fn id(&self) -> SoftKeyId {
        self.id
    }

    pub fn kind(&self) -> SoftKeyKind {
        self.kind
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    /// Whether the referenced hard keys make this key active.
    ///
    /// A combo is active only while both of its hard keys are.
    pub fn is_active_in(&self, hard_keys: &[HardKey]) -> bool {
        let active = |id: HardKeyId| {
            hard_keys
                .get(usize::from(id))
                .is_some_and(|key| key.is_active())
        };

        match self.kind {
            SoftKeyKind::Normal(key) => active(key),
            SoftKeyKind::Combo(first, second) => active(first) && active(second),
        }
    }

    /// Advances the state machine by one tick.
    ///
    /// The tick a press is seen on counts as the first held tick, so a key held
    /// for `long_press_start_ticks` ticks reaches `LongPress`.
    pub fn update(&mut self, active: bool, timing: &Timing) -> TickEvents {
        let mut events = TickEvents::new();

        match self.state {
            KeyState::Idle => {
                if active {
                    self.clicks = 0;
                    self.press(&mut events, timing);
                }
            }
            KeyState::PressDown => {
                if active {
                    self.ticks = self.ticks.saturating_add(1);
                    self.check_long_press(&mut events, timing);
                } else {
                    emit(&mut events, EventKind::Release);
                    if self.is_combo() {
                        // A combo losing either half is over, no click pending
                        self.clicks = 0;
                        self.enter(KeyState::Idle);
                    } else if timing.double_click_enabled() {
                        self.enter(KeyState::PressBreak);
                    } else {
                        emit(&mut events, self.finish_clicks());
                    }
                }
            }
            KeyState::LongPress => {
                if active {
                    self.ticks = self.ticks.saturating_add(1);
                    if timing.enable_long_hold && self.ticks >= timing.hold_interval(self.holds) {
                        self.ticks = 0;
                        self.holds = self.holds.saturating_add(1);
                        emit(&mut events, EventKind::LongPressHold);
                    }
                } else {
                    self.holds = 0;
                    self.enter(KeyState::Idle);
                    emit(&mut events, EventKind::Release);
                }
            }
            KeyState::PressBreak => {
                if active {
                    if self.clicks >= 2 {
                        // Third press: flush the pending double click first
                        emit(&mut events, self.finish_clicks());
                    }
                    self.press(&mut events, timing);
                } else {
                    self.ticks = self.ticks.saturating_add(1);
                    if self.ticks >= timing.double_click_ticks {
                        emit(&mut events, self.finish_clicks());
                    }
                }
            }
        }

        events
    }

    /// Forces the key back to `Idle` without emitting anything.
    pub fn reset(&mut self) {
        self.state = KeyState::Idle;
        self.ticks = 0;
        self.clicks = 0;
        self.holds = 0;
    }

    fn is_combo(&self) -> bool {
        matches!(self.kind, SoftKeyKind::Combo(..))
    }

    /// Starts a press on this tick, counting it as the first held tick.
    fn press(&mut self, events: &mut TickEvents, timing: &Timing) {
        self.clicks = self.clicks.saturating_add(1);
        self.enter(KeyState::PressDown);
        self.ticks = 1;
        emit(events, EventKind::PressDown);
        self.check_long_press(events, timing);
    }

    fn check_long_press(&mut self, events: &mut TickEvents, timing: &Timing) {
        if self.ticks >= timing.long_press_start_ticks {
            self.clicks = 0;
            self.holds = 0;
            self.enter(KeyState::LongPress);
            emit(events, EventKind::LongPressStart);
        }
    }

    fn enter(&mut self, state: KeyState) {
        trace!("soft key {}: {:?} -> {:?}", self.id.0, self.state, state);
        self.state = state;
        self.ticks = 0;
    }

    /// Ends a click sequence, returning the event that summarises it.
    fn finish_clicks(&mut self) -> EventKind {
        let kind = if self.clicks >= 2 {
            EventKind::DoubleClick
        } else {
            EventKind::Click
        };
        self.clicks = 0;
        self.enter(KeyState::Idle);
        kind
    }
}

fn emit(events: &mut TickEvents, kind: EventKind) {
    // Every path pushes at most three events
    let _ = events.push(kind);
}
