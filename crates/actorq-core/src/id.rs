//! Process slot index

use core::fmt;

/// Index of a process slot in the runtime's pre-allocated process array.
///
/// Stable for the slot's lifetime: `id` never changes across retirement
/// and respawn of the same slot. On its own it is not a safe capability —
/// pair it with a generation to get a [`Pid`](crate::pid::Pid) that can
/// detect slot reuse.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ProcSlot(u32);

impl ProcSlot {
    #[inline]
    pub const fn new(id: u32) -> Self {
        ProcSlot(id)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ProcSlot {
    #[inline]
    fn from(id: u32) -> Self {
        ProcSlot(id)
    }
}

impl fmt::Debug for ProcSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcSlot({})", self.0)
    }
}

impl fmt::Display for ProcSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
