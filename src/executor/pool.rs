// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fixed size pool of worker threads

use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};

use super::{Executor, Job};
use crate::error::panic_message;
use crate::options::{Builder, Options};

/// Runs jobs on a fixed set of worker threads fed from one shared queue.
///
/// A job that panics is logged and discarded; the worker survives. Dropping
/// the pool lets the workers finish the queued jobs, then joins them.
pub struct ThreadPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Create a pool with default options, one worker per CPU.
    pub fn new() -> io::Result<ThreadPool> {
        ThreadPool::with_options(Options::new())
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    pub fn with_options(opts: Options) -> io::Result<ThreadPool> {
        if opts.workers == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput,
                                      "Must have at least one worker"));
        }

        let (sender, receiver) = channel::unbounded();
        let mut workers = Vec::with_capacity(opts.workers);

        for index in 0..opts.workers {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(opts.worker_name(index))
                .stack_size(opts.stack_size)
                .spawn(move || run_worker(receiver))?;
            workers.push(handle);
        }

        Ok(ThreadPool {
            sender: Some(sender),
            workers,
        })
    }

    /// Number of worker threads
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers.len()
    }
}

fn run_worker(receiver: Receiver<Job>) {
    let name = thread::current().name().unwrap_or("<unnamed>").to_owned();
    debug!("Worker {} started", name);

    for job in receiver.iter() {
        if let Err(cause) = panic::catch_unwind(AssertUnwindSafe(job)) {
            error!("Job panicked on worker {}: {}", name, panic_message(&*cause));
        }
    }

    debug!("Worker {} stopped", name);
}

impl Executor for ThreadPool {
    fn execute(&self, job: Job) {
        if let Some(ref sender) = self.sender {
            if sender.send(job).is_err() {
                error!("ThreadPool has no running workers, job dropped");
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Closing the queue ends every worker loop once it is drained.
        drop(self.sender.take());

        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            // The last handle may be released by a job running on a worker.
            if worker.thread().id() == current {
                continue;
            }

            if worker.join().is_err() {
                warn!("Worker thread exited abnormally");
            }
        }
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ThreadPool {{ workers: {} }}", self.workers.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;

    #[test]
    fn rejects_zero_workers() {
        let err = ThreadPool::builder().workers(0).build().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn runs_jobs_on_named_workers() {
        let pool = ThreadPool::builder()
            .workers(2)
            .name("pool-test".to_owned())
            .build()
            .unwrap();
        assert_eq!(pool.workers(), 2);

        let (tx, rx) = mpsc::channel();
        pool.execute(Box::new(move || {
            tx.send(thread::current().name().map(str::to_owned)).unwrap();
        }));

        let name = rx.recv().unwrap().unwrap();
        assert!(name.starts_with("pool-test-"));
    }

    #[test]
    fn drop_drains_queue() {
        let hits = Arc::new(AtomicUsize::new(0));

        {
            let pool = ThreadPool::builder().workers(3).build().unwrap();
            for _ in 0..100 {
                let hits = hits.clone();
                pool.execute(Box::new(move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                }));
            }
        }

        assert_eq!(hits.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn survives_panicking_job() {
        let pool = ThreadPool::builder().workers(1).build().unwrap();
        pool.execute(Box::new(|| panic!("job failure")));

        let (tx, rx) = mpsc::channel();
        pool.execute(Box::new(move || tx.send(42).unwrap()));
        assert_eq!(rx.recv().unwrap(), 42);
    }
}
