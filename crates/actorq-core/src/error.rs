//! Error types for the actorq runtime

use core::fmt;

/// Outcome of [`send`](crate::Pid::send) other than a successful enqueue.
///
/// `SEND_SUCCESS` from spec is represented as `Ok(())`; these two variants
/// cover `SEND_FAIL` and `ACTOR_IS_DEAD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The destination's inbox is full, or its `releaseLock` was held by
    /// a concurrent sender or retirement when this send tried to acquire
    /// it. The caller retains ownership of the message in both cases.
    Fail,
    /// The destination's generation no longer matches the PID's — the
    /// process that PID once named has already retired. The caller
    /// retains ownership of the message.
    ActorIsDead,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Fail => write!(f, "send failed: inbox full or destination busy"),
            SendError::ActorIsDead => write!(f, "send failed: destination process has retired"),
        }
    }
}

impl std::error::Error for SendError {}

/// What to do with a message that could not be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageAction {
    /// Hand the message back to the caller via [`SendFailure::message`].
    #[default]
    Keep,
    /// Drop the message (running its `Drop` impl) instead of returning it.
    Remove,
}

/// Returned by `send` when delivery did not succeed. Carries the message
/// back when `action` was [`MessageAction::Keep`].
#[derive(Debug)]
pub struct SendFailure<M> {
    pub error: SendError,
    pub message: Option<M>,
}

impl<M> fmt::Display for SendFailure<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<M: fmt::Debug> std::error::Error for SendFailure<M> {}

/// Failure to admit a new process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    /// The runtime's process table is at `process_cap` capacity.
    AtCapacity,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::AtCapacity => write!(f, "spawn failed: runtime is at process capacity"),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Fatal runtime faults. Unlike [`SendError`]/[`SpawnError`], these are
/// not expected outcomes of normal operation: construction fails fast.
#[derive(Debug)]
pub enum RuntimeError {
    /// A worker OS thread could not be spawned during `Runtime::new`.
    WorkerSpawnFailed(std::io::Error),
    /// `RuntimeConfig` failed validation before the runtime was started.
    InvalidConfig(&'static str),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::WorkerSpawnFailed(e) => write!(f, "failed to spawn worker thread: {e}"),
            RuntimeError::InvalidConfig(msg) => write!(f, "invalid runtime config: {msg}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::WorkerSpawnFailed(e) => Some(e),
            RuntimeError::InvalidConfig(_) => None,
        }
    }
}
