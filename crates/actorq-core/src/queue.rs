//! Fixed-capacity MPMC lock-free ring queue
//!
//! The Vyukov bounded queue (see <https://www.1024cores.net>): each slot
//! carries its own sequence counter instead of a shared head/tail pair
//! guarding the data, which is what lets producers and consumers proceed
//! without a shared lock. Every process's inbox, the run queue, and the
//! free-list of process slots are all one of these.
//!
//! `push`/`pop` never block: a full push or an empty pop returns `false`/
//! `None`, not an error — callers decide whether to retry.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::cell::UnsafeCell;

struct Slot<T> {
    seq: AtomicU32,
    data: UnsafeCell<Option<T>>,
}

/// A fixed-capacity multi-producer multi-consumer lock-free ring.
pub struct BoundedQueue<T> {
    slots: Box<[Slot<T>]>,
    cap: u32,
    first: AtomicU32,
    last: AtomicU32,
    len: AtomicUsize,
}

// Safety: access to each slot's data is arbitrated by the sequence
// counter CAS protocol below, not by `&self` aliasing.
unsafe impl<T: Send> Send for BoundedQueue<T> {}
unsafe impl<T: Send> Sync for BoundedQueue<T> {}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `cap` elements. `cap` need not be a
    /// power of two (this is a sequence-stamped ring, not a mask-indexed
    /// one).
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "BoundedQueue capacity must be non-zero");
        let slots: Box<[Slot<T>]> = (0..cap as u32)
            .map(|i| Slot {
                seq: AtomicU32::new(i),
                data: UnsafeCell::new(None),
            })
            .collect();
        BoundedQueue {
            slots,
            cap: cap as u32,
            first: AtomicU32::new(0),
            last: AtomicU32::new(0),
            len: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap as usize
    }

    /// Approximate occupancy. Exact at quiescence, advisory under
    /// concurrent access.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Try to enqueue `value`. Returns it back on failure (queue full).
    pub fn push(&self, value: T) -> Result<(), T> {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let slot = &self.slots[(last % self.cap) as usize];
            let seq = slot.seq.load(Ordering::Acquire);
            let diff = seq as i64 - last as i64;

            if diff == 0 {
                match self.last.compare_exchange_weak(
                    last,
                    last.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // Safety: the CAS above is this producer's unique
                        // ticket for this slot until it bumps `seq`.
                        unsafe { *slot.data.get() = Some(value) };
                        slot.seq.store(last.wrapping_add(1), Ordering::Release);
                        self.len.fetch_add(1, Ordering::Relaxed);
                        return Ok(());
                    }
                    Err(cur) => last = cur,
                }
            } else if diff < 0 {
                return Err(value);
            } else {
                last = self.last.load(Ordering::Relaxed);
            }
        }
    }

    /// Try to dequeue one value. Returns `None` if the queue is empty.
    pub fn pop(&self) -> Option<T> {
        let mut first = self.first.load(Ordering::Relaxed);
        loop {
            let slot = &self.slots[(first % self.cap) as usize];
            let seq = slot.seq.load(Ordering::Acquire);
            let diff = seq as i64 - (first.wrapping_add(1)) as i64;

            if diff == 0 {
                match self.first.compare_exchange_weak(
                    first,
                    first.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // Safety: the CAS above is this consumer's unique
                        // ticket for this slot until it bumps `seq`.
                        let value = unsafe { (*slot.data.get()).take() };
                        slot.seq
                            .store(first.wrapping_add(self.cap), Ordering::Release);
                        self.len.fetch_sub(1, Ordering::Relaxed);
                        return value;
                    }
                    Err(cur) => first = cur,
                }
            } else if diff < 0 {
                return None;
            } else {
                first = self.first.load(Ordering::Relaxed);
            }
        }
    }

    /// Drain and drop every remaining element, invoking `release` on
    /// each. Not safe to call concurrently with producers/consumers —
    /// the runtime only calls this at teardown, with exclusive access.
    pub fn drain_with<F: FnMut(T)>(&self, mut release: F) {
        while let Some(value) = self.pop() {
            release(value);
        }
    }
}
