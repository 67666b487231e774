//! Handler-return protocol and type erasure for process state/messages
//!
//! User state and messages are opaque payloads to the runtime (§1). A
//! process's handler, together with its private state, is type-erased
//! behind [`DynHandler`] so a single process table can hold processes of
//! unrelated state/message types; [`TypedHandler`] is the adapter that
//! recovers the concrete types on each dispatch.

use std::any::Any;

/// Opaque message envelope. Downcast by [`TypedHandler`] on delivery;
/// dropping it (on a failed `send` with `MessageAction::Remove`, or when
/// an inbox is drained at teardown) runs the payload's own `Drop` — there
/// is no separate release-callback parameter to thread through.
pub type AnyMessage = Box<dyn Any + Send>;

/// The three outcomes a handler invocation can drive (spec §4.3):
///
/// | Code | Effect |
/// |---|---|
/// | `Continue` | process becomes `Running`; batch continues |
/// | `WaitMessage` | process becomes `Waiting`; batch continues (may break on empty inbox) |
/// | `Stop` | process is retired; batch ends |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerReturn {
    Continue,
    WaitMessage,
    Stop,
}

/// Type-erased process handler stored in the process table.
pub trait DynHandler: Send {
    /// Invoke the handler once. `message` is `None` when the process was
    /// dispatched while `Running` (no inbox pop performed); `Some` when
    /// dispatched while `Waiting` with a popped message.
    fn dispatch(&mut self, message: Option<AnyMessage>) -> HandlerReturn;
}

/// Adapts a closure over concrete state/message types into a
/// [`DynHandler`]. The closure owns `state` for the process's whole
/// lifetime; when the process retires, dropping the `TypedHandler` drops
/// `state` — the idiomatic replacement for a C-style `releaseState`
/// destructor callback.
pub struct TypedHandler<S, M, F> {
    state: S,
    f: F,
    _message: std::marker::PhantomData<fn(M)>,
}

impl<S, M, F> TypedHandler<S, M, F>
where
    S: Send + 'static,
    M: Send + 'static,
    F: FnMut(&mut S, Option<M>) -> HandlerReturn + Send,
{
    pub fn new(state: S, f: F) -> Self {
        TypedHandler {
            state,
            f,
            _message: std::marker::PhantomData,
        }
    }
}

impl<S, M, F> DynHandler for TypedHandler<S, M, F>
where
    S: Send + 'static,
    M: Send + 'static,
    F: FnMut(&mut S, Option<M>) -> HandlerReturn + Send,
{
    fn dispatch(&mut self, message: Option<AnyMessage>) -> HandlerReturn {
        let typed = message.map(|m| {
            *m.downcast::<M>()
                .unwrap_or_else(|_| panic!("actorq: message delivered to the wrong process type"))
        });
        (self.f)(&mut self.state, typed)
    }
}
