// The MIT License (MIT)

// Copyright (c) 2015 Y. T. Chung <zonyitoo@gmail.com>

//  Permission is hereby granted, free of charge, to any person obtaining a
//  copy of this software and associated documentation files (the "Software"),
//  to deal in the Software without restriction, including without limitation
//  the rights to use, copy, modify, merge, publish, distribute, sublicense,
//  and/or sell copies of the Software, and to permit persons to whom the
//  Software is furnished to do so, subject to the following conditions:
//
//  The above copyright notice and this permission notice shall be included in
//  all copies or substantial portions of the Software.
//
//  THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS
//  OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//  FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//  AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//  LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
//  FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
//  DEALINGS IN THE SOFTWARE.

//! Single-assignment futures and promises with thread-safe completion
//!
//! A `Promise` is settled exactly once, from any thread; its `Future`s run
//! every registered continuation exactly once, inline or on an `Executor`.
//! `sync` bridges into blocking code and `Flatten` turns an ordered batch of
//! futures into one.

#[macro_use]
extern crate log;

pub use crate::error::{Error, FutureResult};
pub use crate::executor::{Executor, Inline, Job, ManualExecutor, SharedExecutor, ThreadPool};
pub use crate::future::{Flatten, FlattenConcurrent, FlattenLazy, Future, FutureType, Promise, Ready, ResultCallback};
pub use crate::options::{Builder, Options};

pub mod error;
pub mod executor;
pub mod future;
pub mod options;
pub mod sync;

/// Create a promise together with a future observing it.
#[inline]
pub fn make<T>() -> (Promise<T>, Future<T>)
    where T: Clone + Send + 'static
{
    let promise = Promise::new();
    let future = promise.future();
    (promise, future)
}
