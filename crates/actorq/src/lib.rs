//! # actorq
//!
//! A tiny in-process cooperative actor runtime: a fixed pool of worker
//! threads cooperatively schedules a table of lightweight processes, each
//! with its own bounded inbox. There is no async executor and no stack
//! switching — a process's "handler" is an ordinary `FnMut` that runs to
//! completion on whichever worker picked it up, and yields control back
//! by returning.
//!
//! ```
//! use actorq::{HandlerReturn, MessageAction, Runtime, RuntimeConfig, SpawnParams};
//!
//! struct Pong;
//!
//! let runtime = Runtime::new(RuntimeConfig::new().thread_count(2)).unwrap();
//!
//! let (tx, rx) = std::sync::mpsc::channel();
//! let pid = runtime
//!     .spawn(SpawnParams::new(tx, move |tx: &mut std::sync::mpsc::Sender<Pong>, ping: Option<()>| {
//!         if ping.is_some() {
//!             let _ = tx.send(Pong);
//!             HandlerReturn::Stop
//!         } else {
//!             HandlerReturn::WaitMessage
//!         }
//!     }))
//!     .unwrap();
//!
//! runtime.send(&pid, (), MessageAction::Remove).unwrap();
//! rx.recv_timeout(std::time::Duration::from_secs(1)).unwrap();
//! ```

pub use actorq_core::{HandlerReturn, MessageAction, RuntimeError, SendError, SendFailure, SpawnError};
pub use actorq_runtime::{parent, self_pid, receive, Pid, RuntimeConfig};

use std::marker::PhantomData;

/// Spawn a child process from within a running handler, without needing
/// a [`Runtime`] handle in scope — the new process's parent is recorded
/// as [`self_pid`]'s process.
pub fn spawn<S, M, F>(params: SpawnParams<S, M, F>) -> Result<Pid, SpawnError>
where
    S: Send + 'static,
    M: Send + 'static,
    F: FnMut(&mut S, Option<M>) -> HandlerReturn + Send + 'static,
{
    actorq_runtime::spawn(
        params.initial_state,
        params.inbox_cap,
        params.max_messages_per_cycle,
        params.handler,
    )
}

/// Parameters for [`Runtime::spawn`]: the process's private state, its
/// handler, and the two capacity knobs from spec §4.6 — inbox capacity
/// and how many messages a single batch will deliver before yielding the
/// worker to another process.
pub struct SpawnParams<S, M, F> {
    initial_state: S,
    inbox_cap: usize,
    max_messages_per_cycle: usize,
    handler: F,
    _message: PhantomData<fn(M)>,
}

impl<S, M, F> SpawnParams<S, M, F>
where
    S: Send + 'static,
    M: Send + 'static,
    F: FnMut(&mut S, Option<M>) -> HandlerReturn + Send + 'static,
{
    /// Defaults: an inbox capacity of 16 and one message per cycle (fair
    /// round-robin scheduling between processes).
    pub fn new(initial_state: S, handler: F) -> Self {
        SpawnParams {
            initial_state,
            inbox_cap: 16,
            max_messages_per_cycle: 1,
            handler,
            _message: PhantomData,
        }
    }

    pub fn inbox_cap(mut self, n: usize) -> Self {
        self.inbox_cap = n;
        self
    }

    pub fn max_messages_per_cycle(mut self, n: usize) -> Self {
        self.max_messages_per_cycle = n;
        self
    }
}

/// Handle to a running actor runtime.
///
/// Cloning shares the same process table; the worker pool stops when the
/// last clone is dropped (or [`Runtime::release`] is called explicitly).
#[derive(Clone)]
pub struct Runtime(actorq_runtime::Runtime);

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        actorq_runtime::Runtime::new(config).map(Runtime)
    }

    /// Admit a new process (spec §4.6). Fails with
    /// [`SpawnError::AtCapacity`] if the runtime's process table is full.
    ///
    /// The handler is invoked once immediately with `None` (the boot
    /// tick, §4.3) and again with `Some(message)` each time one is
    /// delivered while the process is `Waiting`.
    pub fn spawn<S, M, F>(&self, params: SpawnParams<S, M, F>) -> Result<Pid, SpawnError>
    where
        S: Send + 'static,
        M: Send + 'static,
        F: FnMut(&mut S, Option<M>) -> HandlerReturn + Send + 'static,
    {
        self.0.spawn(
            params.initial_state,
            params.inbox_cap,
            params.max_messages_per_cycle,
            params.handler,
        )
    }

    /// Deliver `message` to `dest`'s inbox (spec §4.4).
    ///
    /// `action` decides what happens to the message on failure:
    /// [`MessageAction::Keep`] hands it back via
    /// [`SendFailure::message`]; [`MessageAction::Remove`] drops it.
    pub fn send<M: Send + 'static>(
        &self,
        dest: &Pid,
        message: M,
        action: MessageAction,
    ) -> Result<(), SendFailure<M>> {
        self.0.send(dest, message, action)
    }

    /// Stop the worker pool and retire any process still on the run
    /// queue. Safe to call more than once; `Drop` calls it too.
    pub fn release(&self) {
        self.0.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[derive(Debug)]
    struct Pong;

    #[test]
    fn ping_pong() {
        let runtime = Runtime::new(RuntimeConfig::new().thread_count(2)).unwrap();
        let (tx, rx) = mpsc::channel();
        let pid = runtime
            .spawn(SpawnParams::new(
                tx,
                move |tx: &mut mpsc::Sender<Pong>, ping: Option<()>| {
                    if ping.is_some() {
                        tx.send(Pong).unwrap();
                        HandlerReturn::Stop
                    } else {
                        HandlerReturn::WaitMessage
                    }
                },
            ))
            .unwrap();

        runtime.send(&pid, (), MessageAction::Remove).unwrap();
        rx.recv_timeout(Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn parent_is_recorded_for_processes_spawned_from_a_handler() {
        let runtime = Runtime::new(RuntimeConfig::new().thread_count(2)).unwrap();
        let (tx, rx) = mpsc::channel::<Option<Pid>>();

        runtime
            .spawn(SpawnParams::new(
                tx,
                move |tx: &mut mpsc::Sender<Option<Pid>>, _msg: Option<()>| {
                    let child_tx = tx.clone();
                    spawn(SpawnParams::new((), move |_: &mut (), _msg: Option<()>| {
                        child_tx.send(parent()).unwrap();
                        HandlerReturn::Stop
                    }))
                    .unwrap();
                    HandlerReturn::Stop
                },
            ))
            .unwrap();

        let observed_parent = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(observed_parent.is_some());
    }

    #[test]
    fn inbox_saturation_then_respawn_reuses_the_slot_with_a_new_generation() {
        let runtime = Runtime::new(RuntimeConfig::new().process_cap(1).thread_count(1)).unwrap();
        let (tx, rx) = mpsc::channel();
        let first = runtime
            .spawn(SpawnParams::new(tx, move |tx: &mut mpsc::Sender<()>, msg: Option<()>| {
                if msg.is_some() {
                    tx.send(()).unwrap();
                    HandlerReturn::Stop
                } else {
                    HandlerReturn::WaitMessage
                }
            }))
            .unwrap();
        runtime.send(&first, (), MessageAction::Remove).unwrap();
        rx.recv_timeout(Duration::from_secs(1)).unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let stale_send = runtime.send(&first, (), MessageAction::Keep);
        assert_eq!(stale_send.unwrap_err().error, SendError::ActorIsDead);

        let (tx2, rx2) = mpsc::channel();
        let second = runtime
            .spawn(SpawnParams::new(tx2, move |tx: &mut mpsc::Sender<()>, _msg: Option<()>| {
                tx.send(()).unwrap();
                HandlerReturn::Stop
            }))
            .unwrap();
        rx2.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(second.id, first.id);
        assert_ne!(second.gen, first.gen);
    }

    #[test]
    fn batch_size_is_bounded_by_max_messages_per_cycle() {
        // 7 messages queued up front, but a batch may deliver at most 3 —
        // the process must be revisited by the scheduler more than once.
        let runtime = Runtime::new(RuntimeConfig::new().thread_count(1)).unwrap();
        let (tx, rx) = mpsc::channel();
        let pid = runtime
            .spawn(
                SpawnParams::new(tx, move |tx: &mut mpsc::Sender<u32>, msg: Option<u32>| {
                    if let Some(n) = msg {
                        tx.send(n).unwrap();
                    }
                    HandlerReturn::WaitMessage
                })
                .inbox_cap(8)
                .max_messages_per_cycle(3),
            )
            .unwrap();

        for n in 0..7u32 {
            runtime.send(&pid, n, MessageAction::Remove).unwrap();
        }

        let mut received = Vec::new();
        for _ in 0..7 {
            received.push(rx.recv_timeout(Duration::from_secs(1)).unwrap());
        }
        assert_eq!(received, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn release_is_idempotent() {
        let runtime = Runtime::new(RuntimeConfig::new().thread_count(2)).unwrap();
        runtime
            .spawn(SpawnParams::new((), |_: &mut (), _msg: Option<()>| {
                HandlerReturn::WaitMessage
            }))
            .unwrap();

        runtime.release();
        runtime.release();
    }

    #[test]
    fn handler_panic_retires_the_process_instead_of_killing_its_worker() {
        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let runtime = Runtime::new(RuntimeConfig::new().process_cap(1).thread_count(1)).unwrap();
        let pid = runtime
            .spawn(SpawnParams::new((), |_: &mut (), _msg: Option<()>| {
                panic!("boom");
            }))
            .unwrap();

        std::panic::set_hook(prev_hook);

        // The slot is retired (not leaked): its capacity is reclaimed, and
        // a stale send against the panicking process's PID reports dead
        // rather than silently vanishing.
        std::thread::sleep(Duration::from_millis(50));
        let stale_send = runtime.send(&pid, (), MessageAction::Keep);
        assert_eq!(stale_send.unwrap_err().error, SendError::ActorIsDead);

        // The worker thread survived the panic and is still servicing the
        // runtime: a second process at the same `process_cap` can spawn.
        let (tx, rx) = mpsc::channel();
        runtime
            .spawn(SpawnParams::new(tx, move |tx: &mut mpsc::Sender<()>, _msg: Option<()>| {
                tx.send(()).unwrap();
                HandlerReturn::Stop
            }))
            .unwrap();
        rx.recv_timeout(Duration::from_secs(1)).unwrap();
    }
}
