//! Runtime configuration

/// Configuration for an [`RuntimeInner`](crate::RuntimeInner).
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Maximum number of live processes (procPool size, spec §4.6).
    pub process_cap: usize,

    /// Number of worker OS threads driving the scheduler.
    pub thread_count: usize,

    /// Capacity of the run queue. Must be at least `process_cap` so every
    /// live process can sit on it simultaneously; defaults to `process_cap`.
    pub run_queue_cap: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let process_cap = 4096;
        Self {
            process_cap,
            thread_count: threads,
            run_queue_cap: process_cap,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of concurrently live processes.
    pub fn process_cap(mut self, n: usize) -> Self {
        self.process_cap = n;
        if self.run_queue_cap < n {
            self.run_queue_cap = n;
        }
        self
    }

    /// Set the worker thread count.
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = n;
        self
    }

    /// Set the run queue capacity explicitly.
    pub fn run_queue_cap(mut self, n: usize) -> Self {
        self.run_queue_cap = n;
        self
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.process_cap == 0 {
            return Err("process_cap must be at least 1");
        }
        if self.thread_count == 0 {
            return Err("thread_count must be at least 1");
        }
        if self.run_queue_cap < self.process_cap {
            return Err("run_queue_cap must be at least process_cap");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_threads() {
        let cfg = RuntimeConfig::new().thread_count(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn builder_bumps_run_queue_cap_when_it_would_fall_below_process_cap() {
        let cfg = RuntimeConfig::new().run_queue_cap(4).process_cap(10);
        assert_eq!(cfg.run_queue_cap, 10);
    }
}
