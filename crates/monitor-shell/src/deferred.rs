//! Work deferred to the next paint or the next event-loop tick.
//!
//! The host flushes `next_frame` right before it paints and `next_tick` once per
//! turn of its event loop.

use std::sync::{Arc, Mutex, PoisonError};

type Job = Box<dyn FnOnce() + Send>;

#[derive(Clone, Default)]
pub struct DeferredQueue {
    jobs: Arc<Mutex<Vec<Job>>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, job: impl FnOnce() + Send + 'static) {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(job));
    }

    /// Runs the jobs queued before this call. Jobs scheduled while running wait
    /// for the next flush.
    pub fn run_pending(&self) -> usize {
        let jobs = std::mem::take(&mut *self.jobs.lock().unwrap_or_else(PoisonError::into_inner));
        let count = jobs.len();
        for job in jobs {
            job();
        }
        count
    }

    pub fn cancel_all(&self) {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Default)]
pub struct UiScheduler {
    pub next_frame: DeferredQueue,
    pub next_tick: DeferredQueue,
}

impl UiScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_all(&self) {
        self.next_frame.cancel_all();
        self.next_tick.cancel_all();
    }
}
