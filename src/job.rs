//! Cooperative job scheduling: synchronous jobs tick once per main-loop
//! pass on the foreground thread; asynchronous jobs tick in a loop on a
//! background thread, sleeping between stalls so they don't spin.
//!
//! Jobs never hold a strong buffer reference between ticks - only a
//! `Weak<BufferHandle>` - so a buffer killed by a command is simply
//! noticed as a dead weak reference the next time the job wakes up,
//! rather than requiring every command that kills a buffer to know which
//! jobs are watching it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, trace};

/// Outcome of one `Job::tick` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobTick {
    /// The job has nothing left to do; drop it.
    Finished,
    /// The job did useful work and should be ticked again immediately.
    MadeProgress,
    /// The job could not make progress this tick (e.g. a lock was busy);
    /// wait before ticking again.
    Stalled,
}

/// One unit of cooperative background or foreground work.
pub trait Job: Send {
    fn tick(&mut self) -> JobTick;

    /// Called when the job is dropped before finishing on its own, so it
    /// can release any private state (e.g. an accumulated token cache).
    fn kill(&mut self) {}
}

/// Shared stop signal: set once at shutdown, observed by every
/// asynchronous job's tick loop so the scheduler can join its background
/// threads promptly instead of waiting for each job to notice on its own.
#[derive(Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn signal(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs synchronous jobs on the caller's thread and asynchronous jobs each
/// on their own background thread, cooperating through a shared
/// `StopFlag`.
pub struct JobScheduler {
    synchronous: Vec<Box<dyn Job>>,
    async_handles: Vec<JoinHandle<()>>,
    stop: StopFlag,
    async_tick_budget: usize,
    stall_retry_delay: Duration,
}

impl JobScheduler {
    pub fn new(async_tick_budget: usize, stall_retry_delay_ms: u64) -> Self {
        Self {
            synchronous: Vec::new(),
            async_handles: Vec::new(),
            stop: StopFlag::new(),
            async_tick_budget,
            stall_retry_delay: Duration::from_millis(stall_retry_delay_ms),
        }
    }

    pub fn push_synchronous(&mut self, job: Box<dyn Job>) {
        self.synchronous.push(job);
    }

    /// Ticks every synchronous job once, dropping (and killing) any that
    /// finished. Called once per main-loop iteration, between keystroke
    /// dispatches.
    pub fn run_synchronous_pass(&mut self) {
        let mut i = 0;
        while i < self.synchronous.len() {
            match self.synchronous[i].tick() {
                JobTick::Finished => {
                    let mut job = self.synchronous.remove(i);
                    job.kill();
                    trace!("synchronous job finished, {} remaining", self.synchronous.len());
                }
                JobTick::MadeProgress | JobTick::Stalled => {
                    i += 1;
                }
            }
        }
    }

    /// Spawns `job` on its own background thread, ticking up to
    /// `async_tick_budget` times per wakeup before yielding, and sleeping
    /// `stall_retry_delay` whenever a tick stalls. Exits when the job
    /// finishes or the scheduler's stop flag is set.
    pub fn spawn_asynchronous(&mut self, mut job: Box<dyn Job>) {
        let stop = self.stop.clone();
        let budget = self.async_tick_budget;
        let delay = self.stall_retry_delay;
        let handle = std::thread::spawn(move || {
            loop {
                if stop.is_set() {
                    job.kill();
                    return;
                }
                let mut stalled_in_a_row = 0;
                for _ in 0..budget {
                    if stop.is_set() {
                        job.kill();
                        return;
                    }
                    match job.tick() {
                        JobTick::Finished => {
                            debug!("asynchronous job finished");
                            return;
                        }
                        JobTick::MadeProgress => {
                            stalled_in_a_row = 0;
                        }
                        JobTick::Stalled => {
                            stalled_in_a_row += 1;
                            break;
                        }
                    }
                }
                if stalled_in_a_row > 0 {
                    std::thread::sleep(delay);
                }
            }
        });
        self.async_handles.push(handle);
    }

    /// Sets the stop flag and joins every background thread. Called at
    /// shutdown, before the editor drops its buffer handles, so no job
    /// outlives the buffers it holds weak references to.
    pub fn shutdown(&mut self) {
        self.stop.signal();
        for handle in self.async_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Re-tokenizes a buffer in the background: accumulates checkpoints into a
/// private `TokenCache`, then publishes by upgrading its read lock to a
/// write lock and swapping the private cache in, discarding its own work
/// instead if another writer raced ahead and covered more ground first.
pub mod syntax_highlight {
    use super::{Job, JobTick};
    use crate::buffer_handle::BufferHandle;
    use crate::token_cache::TokenCache;
    use std::sync::Weak;
    use std::time::{Duration, Instant};

    pub struct SyntaxHighlightJob {
        handle: Weak<BufferHandle>,
        private_cache: TokenCache,
        slice: Duration,
    }

    impl SyntaxHighlightJob {
        pub fn new(handle: Weak<BufferHandle>) -> Self {
            Self { handle, private_cache: TokenCache::default(), slice: Duration::from_millis(2) }
        }
    }

    impl Job for SyntaxHighlightJob {
        fn tick(&mut self) -> JobTick {
            let handle = match self.handle.upgrade() {
                Some(handle) => handle,
                None => return JobTick::Finished,
            };

            let buffer = match handle.try_lock_reading() {
                Some(buffer) => buffer,
                None => return JobTick::Stalled,
            };

            if buffer.token_cache.is_covered(buffer.contents().len()) {
                return JobTick::Finished;
            }

            if self.private_cache.check_points().len() != buffer.token_cache.check_points().len()
                || self.private_cache.change_index() != buffer.token_cache.change_index()
            {
                self.private_cache = buffer.token_cache.clone();
            }

            self.private_cache.update(buffer.contents(), buffer.changes(), buffer.mode.tokenizer.as_ref());

            let (mut state, mut iterator) = match self.private_cache.check_points().last() {
                Some(cp) => (cp.state, buffer.contents().iterator_at(cp.position)),
                None => (0, buffer.contents().start()),
            };

            let started = Instant::now();
            let mut stop = false;
            loop {
                if !self.private_cache.next_check_point(buffer.contents(), buffer.mode.tokenizer.as_ref(), &mut iterator, &mut state) {
                    stop = true;
                    break;
                }
                if started.elapsed() > self.slice {
                    break;
                }
            }

            // `upgrade` may block on other readers and let another writer run
            // first, so re-check whether we were pre-empted before publishing.
            let mut buffer = buffer.upgrade();

            if self.private_cache.check_points().len() < buffer.token_cache.check_points().len() {
                return JobTick::MadeProgress;
            }

            buffer.token_cache = self.private_cache.clone();

            if stop {
                JobTick::Finished
            } else {
                JobTick::MadeProgress
            }
        }

        fn kill(&mut self) {
            self.handle = Weak::new();
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
