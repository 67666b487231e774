//! # actorq-runtime
//!
//! The concrete runtime: a fixed process table, the run queue and free
//! pool that drive admission and scheduling, and the worker thread pool
//! that batches messages through each process's handler.
//!
//! `actorq-core` is generic over the PID's runtime handle type; this
//! crate is where that type is finally concrete (`Arc<RuntimeInner>`),
//! since only here do we know what a process's `parent` field actually
//! points back into.

#![allow(dead_code)]

mod config;
mod process;
mod scheduler;
mod tls;
mod worker;

pub use actorq_core::{MessageAction, RuntimeError, SendError, SendFailure, SpawnError};
pub use config::RuntimeConfig;

use actorq_core::{BoundedQueue, HandlerReturn, ProcSlot};
use process::ProcessCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use worker::WorkerPool;

/// A process reference, concrete to this runtime.
pub type Pid = actorq_core::Pid<Arc<RuntimeInner>>;

/// The runtime's process table and queues, shared by every worker thread
/// and every outstanding `Pid`.
pub struct RuntimeInner {
    processes: Box<[ProcessCell<Pid>]>,
    /// `procPool` (spec §4.6): free slot indices available to `spawn`.
    free_pool: BoundedQueue<ProcSlot>,
    /// `runQueue` (spec §4.3): slots a worker should dispatch next.
    run_queue: BoundedQueue<ProcSlot>,
    /// `procCount` (spec §4.6): live-process admission gate, claimed
    /// optimistically by `spawn` and released by retirement. This, not
    /// `free_pool`'s occupancy, is the source of truth for capacity —
    /// a slot mid-retirement can make `free_pool` look empty before it's
    /// actually returned.
    proc_count: AtomicUsize,
    config: RuntimeConfig,
    shutdown: AtomicBool,
    workers: Mutex<Option<WorkerPool>>,
}

/// Handle to a running actorq runtime.
///
/// Cloning is cheap (an `Arc` bump) and every clone shares the same
/// process table; dropping the last `Runtime` (or calling
/// [`Runtime::release`] explicitly) stops the worker pool.
#[derive(Clone)]
pub struct Runtime(Arc<RuntimeInner>);

impl Runtime {
    /// Build the process table, start the worker pool, and return a
    /// handle to it.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate().map_err(RuntimeError::InvalidConfig)?;

        let processes = (0..config.process_cap)
            .map(|_| ProcessCell::empty())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        let free_pool = BoundedQueue::new(config.process_cap);
        for i in 0..config.process_cap as u32 {
            free_pool
                .push(ProcSlot::new(i))
                .expect("free pool sized to process_cap");
        }

        let run_queue = BoundedQueue::new(config.run_queue_cap);
        let thread_count = config.thread_count;

        let inner = Arc::new(RuntimeInner {
            processes,
            free_pool,
            run_queue,
            proc_count: AtomicUsize::new(0),
            config,
            shutdown: AtomicBool::new(false),
            workers: Mutex::new(None),
        });

        let pool = WorkerPool::start(&inner, thread_count)?;
        *inner.workers.lock().unwrap() = Some(pool);

        tracing::debug!(
            process_cap = inner.config.process_cap,
            threads = thread_count,
            "runtime started"
        );
        Ok(Runtime(inner))
    }

    /// Spawn a new process. `handler` is called with `None` once
    /// immediately (the process's boot tick), then with `Some(message)`
    /// each time one is delivered while `Waiting`.
    pub fn spawn<S, M, F>(
        &self,
        initial_state: S,
        inbox_cap: usize,
        max_messages_per_cycle: usize,
        handler: F,
    ) -> Result<Pid, SpawnError>
    where
        S: Send + 'static,
        M: Send + 'static,
        F: FnMut(&mut S, Option<M>) -> HandlerReturn + Send + 'static,
    {
        let parent = tls::current();
        scheduler::spawn(
            &self.0,
            parent,
            initial_state,
            inbox_cap,
            max_messages_per_cycle,
            handler,
        )
    }

    /// Deliver `message` to `dest`'s inbox.
    pub fn send<M: Send + 'static>(
        &self,
        dest: &Pid,
        message: M,
        action: MessageAction,
    ) -> Result<(), SendFailure<M>> {
        scheduler::send(dest, message, action)
    }

    /// Stop accepting work, join every worker thread, and retire any
    /// process still sitting on the run queue (mirroring the original's
    /// teardown, which drains `runQueue` through the same release path
    /// used for a normal `STOP`). Idempotent.
    pub fn release(&self) {
        if self.0.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(pool) = self.0.workers.lock().unwrap().take() {
            pool.join();
        }
        while let Some(slot) = self.0.run_queue.pop() {
            scheduler::retire(&self.0, slot);
        }
        tracing::debug!("runtime released");
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.release();
    }
}

/// The process currently dispatching on this worker thread, if any.
pub fn self_pid() -> Option<Pid> {
    tls::current()
}

/// The spawning process's `Pid`, if `self_pid()`'s process was spawned
/// from inside another process's handler.
pub fn parent() -> Option<Pid> {
    let current = tls::current()?;
    let cell = &current.runtime.processes[current.id.as_usize()];
    // Safety: called from within the handler that owns this slot.
    unsafe { cell.parent() }.clone()
}

/// Spawn a child process from within a running handler, without needing
/// a [`Runtime`] handle in scope — the new process's parent is recorded
/// as [`self_pid`]'s process.
///
/// Panics if called from outside a dispatching handler; use
/// [`Runtime::spawn`] there instead.
pub fn spawn<S, M, F>(
    initial_state: S,
    inbox_cap: usize,
    max_messages_per_cycle: usize,
    handler: F,
) -> Result<Pid, SpawnError>
where
    S: Send + 'static,
    M: Send + 'static,
    F: FnMut(&mut S, Option<M>) -> HandlerReturn + Send + 'static,
{
    let current = tls::current().expect("actorq: spawn() called outside a running process");
    let runtime = Arc::clone(&current.runtime);
    scheduler::spawn(&runtime, Some(current), initial_state, inbox_cap, max_messages_per_cycle, handler)
}

/// Non-blocking pop of the current process's own inbox, for handlers
/// that want more than the one message auto-delivered per dispatch.
pub fn receive<M: Send + 'static>() -> Option<M> {
    let current = tls::current()?;
    let cell = &current.runtime.processes[current.id.as_usize()];
    let boxed = cell.inbox().pop()?;
    Some(
        *boxed
            .downcast::<M>()
            .unwrap_or_else(|_| panic!("actorq: receive::<M> called with the wrong message type")),
    )
}
