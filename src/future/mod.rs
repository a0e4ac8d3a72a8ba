// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Single-assignment futures with callback continuations
//!
//! A producer keeps a `Promise` and hands out `Future`s for it. Consumers
//! register continuations with `then`, `catch`, `map` and friends; once the
//! producer settles the promise every continuation runs exactly once, no
//! matter whether it was registered before or after that moment.
//!
//! Errors only travel along `catch` and `map`-style chains. A future that
//! fails while only `then` continuations are attached drops the error
//! silently; the failure shows only as the missing side effect.
//!
//! ```
//! use cofuture::{FutureType, Promise};
//!
//! let promise = Promise::<i32>::new();
//! let derived = promise.future().map(None, |v| Ok(v + 1));
//! promise.complete(42);
//! assert_eq!(derived.sync(None).unwrap(), 43);
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::error::{Error, FutureResult};
use crate::executor::SharedExecutor;

pub use self::cell::{ResultCallback, ResultCell};
pub use self::flatten::{Flatten, FlattenConcurrent, FlattenLazy};
pub use self::future::Future;
pub use self::promise::Promise;
pub use self::ready::Ready;

mod cell;
mod flatten;
mod future;
mod promise;
mod ready;
mod wait;

/// Anything that eventually yields a `FutureResult`.
///
/// Implementors only provide `complete_or_await`; every combinator is built
/// on top of it.
pub trait FutureType {
    type Expectation: Clone + Send + 'static;

    /// Run `callback` with the terminal result exactly once: immediately if
    /// it is known already, otherwise when it becomes known. With an
    /// executor the callback is submitted to it rather than called directly.
    fn complete_or_await(&self,
                         executor: Option<&SharedExecutor>,
                         callback: ResultCallback<Self::Expectation>);

    /// Run `on_value` if this future is fulfilled. Errors are skipped.
    fn then<F>(&self, executor: Option<&SharedExecutor>, on_value: F) -> &Self
        where F: FnOnce(Self::Expectation) + Send + 'static
    {
        self.complete_or_await(executor, Box::new(move |result| {
            if let Ok(value) = result {
                on_value(value);
            }
        }));
        self
    }

    /// Run `on_error` if this future fails. Values are skipped.
    fn catch<F>(&self, executor: Option<&SharedExecutor>, on_error: F)
        where F: FnOnce(Error) + Send + 'static
    {
        self.complete_or_await(executor, Box::new(move |result| {
            if let Err(error) = result {
                on_error(error);
            }
        }));
    }

    /// Run `callback` on either outcome.
    fn always<F>(&self, executor: Option<&SharedExecutor>, callback: F) -> &Self
        where F: FnOnce() + Send + 'static
    {
        self.complete_or_await(executor, Box::new(move |_| callback()));
        self
    }

    /// Derive a new future from this one's value.
    ///
    /// An error from this future skips `transform` and fails the derived
    /// future with the same error. An error returned by `transform`, or a
    /// panic inside it, fails the derived future instead.
    fn map<U, F>(&self, executor: Option<&SharedExecutor>, transform: F) -> Future<U>
        where U: Clone + Send + 'static,
              F: FnOnce(Self::Expectation) -> FutureResult<U> + Send + 'static
    {
        let promise = Promise::new();
        let derived = promise.future();
        let on_error = promise.clone();

        self.then(executor, move |value| {
            promise.complete_with(guarded(move || transform(value)))
        })
        .catch(executor, move |error| on_error.fail(error));

        derived
    }

    /// Like `map`, but `callback` produces another future to follow.
    fn flat_map<R, F>(&self, executor: Option<&SharedExecutor>, callback: F) -> Future<R::Expectation>
        where R: FutureType,
              F: FnOnce(Self::Expectation) -> FutureResult<R> + Send + 'static
    {
        let promise = Promise::new();
        let derived = promise.future();
        let on_error = promise.clone();

        self.then(executor, move |value| {
            match guarded(move || callback(value)) {
                Ok(next) => next.chain(promise),
                Err(error) => promise.fail(error),
            }
        })
        .catch(executor, move |error| on_error.fail(error));

        derived
    }

    /// Settle `promise` with whatever this future settles with.
    fn chain(&self, promise: Promise<Self::Expectation>) {
        self.complete_or_await(None, Box::new(move |result| promise.complete_with(result)));
    }

    /// Block the calling thread until this future settles or `deadline`
    /// passes, then return its value or error.
    ///
    /// Pass `None` to wait without a deadline. On timeout the result is
    /// `Error::Timeout`; the future is unaffected and the callback `sync`
    /// registered still fires, unseen, when it eventually settles.
    ///
    /// Never call this from the only thread that could settle the future,
    /// such as a single-threaded executor's own worker. It will deadlock,
    /// or time out if a deadline was given. This is not detected.
    fn sync<D>(&self, deadline: D) -> FutureResult<Self::Expectation>
        where D: Into<Option<Instant>>
    {
        wait::blocking_wait(self, deadline.into())
    }

    /// `sync` with a deadline of `timeout` from now.
    fn sync_timeout(&self, timeout: Duration) -> FutureResult<Self::Expectation> {
        self.sync(Instant::now() + timeout)
    }
}

/// Run a user transform, turning a panic into `Error::Panicked`.
fn guarded<R, F>(f: F) -> FutureResult<R>
    where F: FnOnce() -> FutureResult<R>
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(cause) => Err(Error::from_panic(cause)),
    }
}
