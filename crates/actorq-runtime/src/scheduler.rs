//! Cooperative batching loop and the `spawn`/`send`/retire operations
//! (spec §4.3, §4.4, §4.5, §4.6)

use crate::process::ProcessCell;
use crate::{tls, Pid, RuntimeInner};
use actorq_core::{
    AnyMessage, DynHandler, HandlerReturn, MessageAction, ProcSlot, RunState, SendError,
    SendFailure, SpawnError, TypedHandler,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Runs on every worker thread until the runtime is released.
pub fn worker_loop(runtime: Arc<RuntimeInner>) {
    loop {
        if runtime.shutdown.load(Ordering::Acquire) {
            break;
        }
        match runtime.run_queue.pop() {
            Some(slot) => dispatch_batch(&runtime, slot),
            None => {
                std::thread::yield_now();
                std::hint::spin_loop();
            }
        }
    }
}

/// Dispatch one process for up to `maxMessagePerCycle` handler
/// invocations, then either requeue it or retire it.
fn dispatch_batch(runtime: &Arc<RuntimeInner>, slot: ProcSlot) {
    let cell: &ProcessCell<Pid> = &runtime.processes[slot.as_usize()];

    let gen = cell.gen.load(Ordering::Relaxed);
    let pid = Pid::new(Arc::clone(runtime), slot, gen);
    tls::set_current(Some(pid));

    let max_cycle = unsafe { cell.max_messages_per_cycle() }.max(1);
    let mut retired = false;

    for _ in 0..max_cycle {
        // Safety: this worker owns `slot` — it was just popped from the
        // run queue and no other worker can hold it concurrently.
        let run_state = unsafe { cell.run_state() };
        let message = if run_state.is_waiting() {
            match cell.inbox().pop() {
                Some(m) => Some(m),
                None => break,
            }
        } else {
            None
        };

        let handler: &mut Box<dyn DynHandler> = unsafe { cell.handler_mut() };
        // spec §7: no exception propagates from a handler into the
        // runtime — a panic converts to STOP instead of taking the
        // worker thread down with it.
        let ret = match catch_unwind(AssertUnwindSafe(|| handler.dispatch(message))) {
            Ok(ret) => ret,
            Err(_) => {
                error!(slot = slot.as_u32(), "handler panicked, retiring process");
                HandlerReturn::Stop
            }
        };
        match ret {
            HandlerReturn::Continue => unsafe { cell.set_run_state(RunState::Running) },
            HandlerReturn::WaitMessage => unsafe { cell.set_run_state(RunState::Waiting) },
            HandlerReturn::Stop => {
                retired = true;
                break;
            }
        }
    }

    tls::set_current(None);

    if retired {
        trace!(slot = slot.as_u32(), "process stopped");
        retire(runtime, slot);
        return;
    }

    // End of batch (spec §4.3): an alive process goes back onto the run
    // queue unconditionally, whether RUNNING or WAITING with an empty
    // inbox. A WAITING process with nothing to do just cycles straight
    // back through on its next turn. `send` never touches `run_queue`
    // itself, so a slot is only ever requeued by the one worker that is
    // currently dispatching it — no second worker can ever pick up the
    // same slot while a batch is still in flight.
    push_run_queue_spinning(runtime, slot);
}

/// Push `slot` onto the run queue, yielding and retrying while it is
/// transiently full (spec §4.3/§4.6: bounded by `processCap`, so progress
/// is guaranteed).
fn push_run_queue_spinning(runtime: &Arc<RuntimeInner>, slot: ProcSlot) {
    let mut value = slot;
    while let Err(rejected) = runtime.run_queue.push(value) {
        value = rejected;
        std::thread::yield_now();
        std::hint::spin_loop();
    }
}

/// Release a process's handler/state/inbox and return its slot to the
/// free pool (spec §4.5). The C original drains any process still on the
/// run queue through this same path at teardown; `Runtime::release`
/// relies on that.
pub fn retire(runtime: &Arc<RuntimeInner>, slot: ProcSlot) {
    let cell = &runtime.processes[slot.as_usize()];
    {
        let _guard = cell.release_lock.lock();
        unsafe { cell.retire() };
    }
    runtime.proc_count.fetch_sub(1, Ordering::AcqRel);
    let _ = runtime.free_pool.push(slot);
}

pub fn spawn<S, M, F>(
    runtime: &Arc<RuntimeInner>,
    parent: Option<Pid>,
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
    // Admission gate (spec §4.6 step 1): optimistically claim a seat,
    // rolling back if that overshoots `process_cap`. A transiently empty
    // `free_pool` (a slot mid-retirement, generation bumped but not yet
    // pushed back) must never read as "at capacity" — this counter is
    // the thing that actually tracks capacity; `free_pool` is just where
    // claimed seats are handed out from.
    let prev = runtime.proc_count.fetch_add(1, Ordering::AcqRel);
    if prev >= runtime.config.process_cap {
        runtime.proc_count.fetch_sub(1, Ordering::AcqRel);
        return Err(SpawnError::AtCapacity);
    }

    // Step 2: a slot is guaranteed to appear — the admission gate above
    // ensures fewer than `process_cap` seats are claimed at any time.
    let mut slot = runtime.free_pool.pop();
    while slot.is_none() {
        std::thread::yield_now();
        std::hint::spin_loop();
        slot = runtime.free_pool.pop();
    }
    let slot = slot.expect("loop only exits once a slot is popped");

    let cell = &runtime.processes[slot.as_usize()];
    let boxed_handler: Box<dyn DynHandler> = Box::new(TypedHandler::new(initial_state, handler));

    let inbox_cap = inbox_cap.max(1);
    // A batch can never deliver more messages than the inbox can hold.
    let max_messages_per_cycle = max_messages_per_cycle.max(1).min(inbox_cap);

    // Safety: `slot` was just taken off the free pool — no `Pid` naming
    // it exists yet, so nothing else can be touching this cell.
    unsafe {
        cell.install(parent, boxed_handler, inbox_cap, max_messages_per_cycle);
    }

    let gen = cell.gen.load(Ordering::Relaxed);
    push_run_queue_spinning(runtime, slot);

    debug!(slot = slot.as_u32(), gen, "process spawned");
    Ok(Pid::new(Arc::clone(runtime), slot, gen))
}

pub fn send<M: Send + 'static>(
    dest: &Pid,
    message: M,
    action: MessageAction,
) -> Result<(), SendFailure<M>> {
    let cell = &dest.runtime.processes[dest.id.as_usize()];

    // Steps 1 and 2 (spec §4.4): the caller retains the payload
    // unconditionally on these two failures — `action` only governs
    // disposition of a message that made it as far as a full inbox
    // (step 3).
    let guard = match cell.release_lock.try_lock() {
        Some(g) => g,
        None => {
            return Err(SendFailure {
                error: SendError::Fail,
                message: Some(message),
            })
        }
    };

    if cell.gen.load(Ordering::Relaxed) != dest.gen {
        return Err(SendFailure {
            error: SendError::ActorIsDead,
            message: Some(message),
        });
    }

    let boxed: AnyMessage = Box::new(message);
    match cell.inbox().push(boxed) {
        Ok(()) => {
            drop(guard);
            Ok(())
        }
        Err(boxed) => {
            drop(guard);
            let message = *boxed
                .downcast::<M>()
                .unwrap_or_else(|_| unreachable!("send pushed and popped the same concrete type"));
            Err(SendFailure {
                error: SendError::Fail,
                message: match action {
                    MessageAction::Keep => Some(message),
                    MessageAction::Remove => None,
                },
            })
        }
    }
}
