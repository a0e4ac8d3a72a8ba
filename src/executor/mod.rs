// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Places to run future callbacks
//!
//! Every combinator takes an `Option<&SharedExecutor>`. With `None` the
//! callback runs on whichever thread settles the future (or on the
//! registering thread, if the future is already settled). With an executor
//! the callback is submitted to it instead.
//!
//! There is no process-wide default executor. Pass one in where it is needed.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::sync::Spinlock;

pub use self::pool::ThreadPool;

mod pool;

/// A unit of work submitted to an `Executor`.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Shared handle to an executor, as stored alongside each awaiter.
pub type SharedExecutor = Arc<dyn Executor>;

/// Something able to run submitted jobs.
pub trait Executor: Send + Sync {
    /// Run `job`, now or later, on this or another thread. Must not drop it
    /// unexecuted while the executor is alive.
    fn execute(&self, job: Job);
}

/// Runs every job immediately on the submitting thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Executor for Inline {
    #[inline]
    fn execute(&self, job: Job) {
        job()
    }
}

/// Queues jobs until `run_pending` is called.
///
/// Useful where the point in time a callback runs has to be controlled,
/// such as in tests.
#[derive(Default)]
pub struct ManualExecutor {
    queue: Spinlock<VecDeque<Job>>,
}

impl ManualExecutor {
    pub fn new() -> ManualExecutor {
        ManualExecutor::default()
    }

    /// Number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run queued jobs until the queue is empty, including jobs queued by
    /// the jobs themselves. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;

        loop {
            // The lock must not be held while the job runs, it may submit more.
            let job = self.queue.lock().pop_front();
            match job {
                Some(job) => {
                    job();
                    count += 1;
                }
                None => return count,
            }
        }
    }
}

impl Executor for ManualExecutor {
    fn execute(&self, job: Job) {
        self.queue.lock().push_back(job);
    }
}

impl fmt::Debug for ManualExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ManualExecutor {{ pending: {} }}", self.pending())
    }
}
