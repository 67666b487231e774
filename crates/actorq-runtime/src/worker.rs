//! Worker thread pool
//!
//! Workers are plain OS threads; there is no priority or preemption here
//! (spec Non-goals) — each one just loops `scheduler::worker_loop` until
//! the runtime is released.

use crate::RuntimeInner;
use actorq_core::RuntimeError;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn start(runtime: &Arc<RuntimeInner>, thread_count: usize) -> Result<Self, RuntimeError> {
        let mut handles = Vec::with_capacity(thread_count);
        for i in 0..thread_count {
            let rt = Arc::clone(runtime);
            let handle = thread::Builder::new()
                .name(format!("actorq-worker-{i}"))
                .spawn(move || crate::scheduler::worker_loop(rt))
                .map_err(RuntimeError::WorkerSpawnFailed)?;
            handles.push(handle);
        }
        Ok(WorkerPool { handles })
    }

    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}
