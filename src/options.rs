// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Thread pool options

use std::default::Default;
use std::io;

use crate::executor::ThreadPool;

/// Thread pool options
#[derive(Debug, Clone)]
pub struct Options {
    pub workers: usize,
    pub stack_size: usize,
    pub name: Option<String>,
}

/// Default worker stack size, 2MB
pub const DEFAULT_STACK: usize = 2 * 1024 * 1024; // 2MB

impl Options {
    pub fn new() -> Options {
        Options {
            workers: num_cpus::get(),
            stack_size: DEFAULT_STACK,
            name: None,
        }
    }

    pub fn workers(&mut self, workers: usize) -> &mut Options {
        self.workers = workers;
        self
    }

    pub fn stack_size(&mut self, size: usize) -> &mut Options {
        self.stack_size = size;
        self
    }

    pub fn name(&mut self, name: String) -> &mut Options {
        self.name = Some(name);
        self
    }

    /// Name of the worker with index `index`.
    pub(crate) fn worker_name(&self, index: usize) -> String {
        match self.name {
            Some(ref name) => format!("{}-{}", name, index),
            None => format!("cofuture-worker-{}", index),
        }
    }
}

impl Default for Options {
    fn default() -> Options {
        Options::new()
    }
}

/// Thread pool configuration. Provides detailed control over the properties of a new `ThreadPool`.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    opts: Options,
}

impl Builder {
    /// Generates the base configuration for a pool, from which configuration methods can be chained.
    pub fn new() -> Builder {
        Builder { opts: Options::new() }
    }

    /// Sets the number of worker threads.
    #[inline]
    pub fn workers(mut self, workers: usize) -> Builder {
        self.opts.workers = workers;
        self
    }

    /// Sets the size of the stack for each worker thread.
    #[inline]
    pub fn stack_size(mut self, stack_size: usize) -> Builder {
        self.opts.stack_size = stack_size;
        self
    }

    /// Names the workers. Each thread gets the name with its index appended.
    #[inline]
    pub fn name(mut self, name: String) -> Builder {
        self.opts.name = Some(name);
        self
    }

    /// Spawn the workers
    pub fn build(self) -> io::Result<ThreadPool> {
        ThreadPool::with_options(self.opts)
    }
}
