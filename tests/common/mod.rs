//! Shared test infrastructure for button-events integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::RefCell;
use std::rc::Rc;

use button_events::{EventKind, EventQueue, HardKeyId, KeyEngine, KeyEvent, KeyReader};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

pub const HIGH: bool = true;
pub const LOW: bool = false;

// ============================================================================
// Mock Readers
// ============================================================================

/// Pin levels the test can change between scans.
///
/// Cloning shares the same levels, so one clone goes into the engine and the
/// test keeps the other.
#[derive(Clone)]
pub struct MockPins {
    levels: Rc<RefCell<Vec<bool>>>,
    reads: Rc<RefCell<Vec<usize>>>,
}

impl MockPins {
    /// `count` pins, all starting at `level`.
    pub fn new(count: usize, level: bool) -> Self {
        Self {
            levels: Rc::new(RefCell::new(vec![level; count])),
            reads: Rc::new(RefCell::new(vec![0; count])),
        }
    }

    pub fn set(&self, pin: usize, level: bool) {
        self.levels.borrow_mut()[pin] = level;
    }

    /// How many times the engine sampled `pin`.
    pub fn reads(&self, pin: usize) -> usize {
        self.reads.borrow()[pin]
    }
}

impl KeyReader for MockPins {
    fn read(&mut self, key: HardKeyId) -> bool {
        let idx = key.0 as usize;
        self.reads.borrow_mut()[idx] += 1;
        self.levels.borrow()[idx]
    }
}

/// Replays one raw level per tick for a single pin, then holds the last one.
pub struct ScriptedPin {
    script: Vec<bool>,
    pos: usize,
}

impl ScriptedPin {
    pub fn new(script: &[bool]) -> Self {
        Self {
            script: script.to_vec(),
            pos: 0,
        }
    }
}

impl KeyReader for ScriptedPin {
    fn read(&mut self, _key: HardKeyId) -> bool {
        let level = self
            .script
            .get(self.pos)
            .or(self.script.last())
            .copied()
            .unwrap_or(HIGH);
        self.pos += 1;
        level
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Scans `ticks` times, draining the queue after every tick.
pub fn run<R: KeyReader, const Q: usize, const HK: usize, const SK: usize>(
    engine: &mut KeyEngine<R, EventQueue<Q>, HK, SK>,
    ticks: usize,
) -> Vec<KeyEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        engine.scan();
        while let Some(event) = engine.fetch_event() {
            events.push(event);
        }
    }
    events
}

/// Drops ids and ticks, keeping only the event kinds.
pub fn kinds(events: &[KeyEvent]) -> Vec<EventKind> {
    events.iter().map(|event| event.kind).collect()
}
