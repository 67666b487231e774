//! The process record (spec §3, §4.2)
//!
//! Each slot in the runtime's process table is one `ProcessCell`. Fields
//! are wrapped in `UnsafeCell` rather than a general-purpose lock because
//! every field except `gen` and `release_lock` itself is only ever
//! touched by the single worker thread that currently owns the slot: the
//! worker that popped it off the run queue (while batching), or the
//! caller of `spawn`/retire (before the slot is published or after it is
//! taken off the run queue for good). `gen` and the inbox are the two
//! fields `send` also touches, and both are guarded by `release_lock`
//! (spec §4.4).

use actorq_core::{AnyMessage, BoundedQueue, DynHandler, RunState, SpinLock};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, Ordering};

pub struct ProcessCell<P> {
    pub gen: AtomicU32,
    parent: UnsafeCell<Option<P>>,
    handler: UnsafeCell<Option<Box<dyn DynHandler>>>,
    inbox: UnsafeCell<Option<BoundedQueue<AnyMessage>>>,
    run_state: UnsafeCell<RunState>,
    max_messages_per_cycle: UnsafeCell<usize>,
    /// Serializes `send`/retire access to `gen` and `inbox` (spec §4.4).
    pub release_lock: SpinLock<()>,
}

// Safety: every field is either atomic, behind `release_lock`, or touched
// exclusively by whichever worker currently owns the slot (see module doc).
unsafe impl<P: Send> Send for ProcessCell<P> {}
unsafe impl<P: Send> Sync for ProcessCell<P> {}

impl<P> ProcessCell<P> {
    pub fn empty() -> Self {
        ProcessCell {
            gen: AtomicU32::new(0),
            parent: UnsafeCell::new(None),
            handler: UnsafeCell::new(None),
            inbox: UnsafeCell::new(None),
            run_state: UnsafeCell::new(RunState::Running),
            max_messages_per_cycle: UnsafeCell::new(1),
            release_lock: SpinLock::new(()),
        }
    }

    /// Publish a freshly spawned process into this slot.
    ///
    /// # Safety
    /// Caller must hold exclusive access to the slot: it must have just
    /// been popped from the free pool and not yet handed out as a `Pid`.
    pub unsafe fn install(
        &self,
        parent: Option<P>,
        handler: Box<dyn DynHandler>,
        inbox_cap: usize,
        max_messages_per_cycle: usize,
    ) {
        *self.parent.get() = parent;
        *self.handler.get() = Some(handler);
        *self.inbox.get() = Some(BoundedQueue::new(inbox_cap));
        *self.run_state.get() = RunState::Running;
        *self.max_messages_per_cycle.get() = max_messages_per_cycle;
    }

    /// # Safety
    /// Caller must be the worker currently owning this slot.
    pub unsafe fn parent(&self) -> &Option<P> {
        &*self.parent.get()
    }

    /// # Safety
    /// Caller must be the worker currently owning this slot.
    pub unsafe fn run_state(&self) -> RunState {
        *self.run_state.get()
    }

    /// # Safety
    /// Caller must be the worker currently owning this slot.
    pub unsafe fn set_run_state(&self, state: RunState) {
        *self.run_state.get() = state;
    }

    /// # Safety
    /// Caller must be the worker currently owning this slot.
    pub unsafe fn max_messages_per_cycle(&self) -> usize {
        *self.max_messages_per_cycle.get()
    }

    /// # Safety
    /// Caller must be the worker currently owning this slot.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn handler_mut(&self) -> &mut Box<dyn DynHandler> {
        (*self.handler.get())
            .as_mut()
            .expect("ProcessCell::handler_mut called on a retired slot")
    }

    /// Inbox access for `send`: safe to call concurrently from any
    /// thread, since the queue itself is lock-free and this accessor only
    /// hands out a shared reference to it. Callers still need
    /// `release_lock` to validate `gen` first (spec §4.4).
    pub fn inbox(&self) -> &BoundedQueue<AnyMessage> {
        // Safety: the inbox is installed before the slot's `Pid` is ever
        // handed to anyone, and only ever replaced (in `install`) while
        // the slot is unpublished, so this reference is always valid for
        // a live slot.
        unsafe {
            (*self.inbox.get())
                .as_ref()
                .expect("ProcessCell::inbox called on a never-spawned slot")
        }
    }

    /// Tear down this slot's contents, dropping the handler (and with it
    /// the user state) and draining any remaining inbox messages.
    ///
    /// # Safety
    /// Caller must hold `release_lock` and the slot must be off the run
    /// queue for good (spec §4.5).
    pub unsafe fn retire(&self) {
        (*self.handler.get()).take();
        if let Some(inbox) = (*self.inbox.get()).take() {
            inbox.drain_with(drop);
        }
        *self.parent.get() = None;
        self.gen.fetch_add(1, Ordering::Relaxed);
    }
}
