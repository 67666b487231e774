//! Thread-local tracking of the process currently dispatching on this
//! worker (spec §4.7). Backs the free-function `self_pid`/`parent`/
//! `receive` API the facade crate exposes to handler bodies.

use crate::Pid;
use std::cell::RefCell;

thread_local! {
    static CURRENT: RefCell<Option<Pid>> = const { RefCell::new(None) };
}

/// Set the process this worker is about to dispatch. Pass `None` when
/// the worker goes idle between batches.
pub fn set_current(pid: Option<Pid>) {
    CURRENT.with(|cell| *cell.borrow_mut() = pid);
}

/// The process currently dispatching on this thread, if any.
pub fn current() -> Option<Pid> {
    CURRENT.with(|cell| cell.borrow().clone())
}
