//! Process identifier

use crate::id::ProcSlot;
use core::fmt;

/// A stable-capability reference to a process slot: `{ runtime, id, gen }`.
///
/// A `Pid` is valid only as long as the slot's live generation matches the
/// generation recorded here — checked by `send` under the destination's
/// `releaseLock` (§4.4). `runtime` is opaque to `actorq-core`; the runtime
/// crate fills it in with a handle (typically `Arc<RuntimeInner>`) so a
/// `Pid` can be sent a message without the caller threading a `&Runtime`
/// through.
#[derive(Clone)]
pub struct Pid<R> {
    pub runtime: R,
    pub id: ProcSlot,
    pub gen: u32,
}

impl<R> Pid<R> {
    pub const fn new(runtime: R, id: ProcSlot, gen: u32) -> Self {
        Pid { runtime, id, gen }
    }
}

/// Two PIDs are equal when they name the same slot and generation,
/// regardless of which runtime handle instance produced them.
impl<R> PartialEq for Pid<R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.gen == other.gen
    }
}

impl<R> Eq for Pid<R> {}

impl<R> fmt::Debug for Pid<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pid").field("id", &self.id).field("gen", &self.gen).finish()
    }
}
