//! # actorq-core
//!
//! Platform-agnostic types for the actorq cooperative actor runtime: the
//! lock-free bounded ring queue, process identity and run-state, the
//! handler-return protocol, and the error types shared across crates.
//!
//! All OS-facing plumbing (the worker pool, thread-local current-process
//! tracking, the concrete process table) lives in `actorq-runtime`.
//!
//! ## Modules
//!
//! - `id` - process slot index
//! - `pid` - generation-stamped process reference
//! - `state` - process run-state
//! - `queue` - the Vyukov bounded MPMC ring
//! - `handler` - handler-return protocol and state/message type erasure
//! - `spinlock` - internal spinlock primitive
//! - `error` - error types

#![allow(dead_code)]

pub mod error;
pub mod handler;
pub mod id;
pub mod pid;
pub mod queue;
pub mod spinlock;
pub mod state;

pub use error::{MessageAction, RuntimeError, SendError, SendFailure, SpawnError};
pub use handler::{AnyMessage, DynHandler, HandlerReturn, TypedHandler};
pub use id::ProcSlot;
pub use pid::Pid;
pub use queue::BoundedQueue;
pub use spinlock::{SpinLock, SpinLockGuard};
pub use state::RunState;
