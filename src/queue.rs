//! Bounded single-producer/single-consumer event queue.
//!
//! The scan context pushes, the application pops. Indices are free-running
//! counters masked by the power-of-two capacity, so `used = write - read` and
//! no slot is wasted. Only atomic loads and stores are used, which keeps the
//! queue usable on cores without compare-and-swap.
//!
//! When the queue is full the newest event is dropped and counted.

use crate::types::KeyEvent;
use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Destination for produced events.
pub trait EventSink {
    /// Offers an event. Returns false if it was dropped.
    fn push(&mut self, event: KeyEvent) -> bool;
}

/// Fixed-capacity ring buffer of [`KeyEvent`]s.
///
/// `Q` must be a power of two; anything else fails to compile.
///
/// Owned directly, the queue can be used from one context through `&mut self`.
/// To feed it from an interrupt and drain it from the main loop, [`split`](Self::split)
/// it into an [`EventProducer`] and an [`EventConsumer`].
pub struct EventQueue<const Q: usize> {
    slots: [UnsafeCell<MaybeUninit<KeyEvent>>; Q],
    write: AtomicUsize,
    read: AtomicUsize,
    dropped: AtomicU32,
}

// Slots are only touched by the single producer (between `read` and `write`
// being published) or the single consumer, which `split` enforces.
unsafe impl<const Q: usize> Sync for EventQueue<Q> {}

impl<const Q: usize> EventQueue<Q> {
    const MASK: usize = {
        assert!(Q.is_power_of_two(), "event queue capacity must be a power of two");
        Q - 1
    };

    /// Creates an empty queue.
    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            slots: [const { UnsafeCell::new(MaybeUninit::uninit()) }; Q],
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Appends an event. Returns false and counts a drop if the queue is full.
    pub fn push(&mut self, event: KeyEvent) -> bool {
        self.enqueue(event)
    }

    /// Removes the oldest event.
    pub fn pop(&mut self) -> Option<KeyEvent> {
        self.dequeue()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= Q
    }

    pub const fn capacity(&self) -> usize {
        Q
    }

    /// Events dropped because the queue was full. Wraps on overflow.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Splits the queue into its producer and consumer halves.
    pub fn split(&mut self) -> (EventProducer<'_, Q>, EventConsumer<'_, Q>) {
        let queue: &Self = self;
        (
            EventProducer {
                queue,
                _not_sync: PhantomData,
            },
            EventConsumer {
                queue,
                _not_sync: PhantomData,
            },
        )
    }

    /// Producer side. Must only ever run in one context at a time.
    fn enqueue(&self, event: KeyEvent) -> bool {
        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= Q {
            // Single producer, so a plain load/store is enough
            let dropped = self.dropped.load(Ordering::Relaxed);
            self.dropped.store(dropped.wrapping_add(1), Ordering::Relaxed);
            warn!("event queue full, dropping {:?}", event);
            return false;
        }

        // SAFETY: the slot at `write` is outside the readable range until the
        // store below publishes it, so the consumer cannot be reading it.
        unsafe {
            (*self.slots[write & Self::MASK].get()).write(event);
        }
        self.write.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Consumer side. Must only ever run in one context at a time.
    fn dequeue(&self) -> Option<KeyEvent> {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: `read != write`, so the producer initialised this slot and
        // published it with the release store we acquired above.
        let event = unsafe { (*self.slots[read & Self::MASK].get()).assume_init() };
        self.read.store(read.wrapping_add(1), Ordering::Release);
        Some(event)
    }
}

impl<const Q: usize> Default for EventQueue<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const Q: usize> EventSink for EventQueue<Q> {
    fn push(&mut self, event: KeyEvent) -> bool {
        self.enqueue(event)
    }
}

/// Write half of a split [`EventQueue`]. Give this to the scan context.
pub struct EventProducer<'q, const Q: usize> {
    queue: &'q EventQueue<Q>,
    // Send but not Sync: one context owns each half
    _not_sync: PhantomData<core::cell::Cell<()>>,
}

impl<const Q: usize> EventProducer<'_, Q> {
    /// Appends an event. Returns false and counts a drop if the queue is full.
    pub fn push(&mut self, event: KeyEvent) -> bool {
        self.queue.enqueue(event)
    }

    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    pub fn dropped(&self) -> u32 {
        self.queue.dropped()
    }
}

impl<const Q: usize> EventSink for EventProducer<'_, Q> {
    fn push(&mut self, event: KeyEvent) -> bool {
        self.queue.enqueue(event)
    }
}

/// Read half of a split [`EventQueue`]. Give this to the application.
pub struct EventConsumer<'q, const Q: usize> {
    queue: &'q EventQueue<Q>,
    _not_sync: PhantomData<core::cell::Cell<()>>,
}

impl<const Q: usize> EventConsumer<'_, Q> {
    /// Removes the oldest event.
    pub fn pop(&mut self) -> Option<KeyEvent> {
        self.queue.dequeue()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn dropped(&self) -> u32 {
        self.queue.dropped()
    }
}
