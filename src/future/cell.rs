// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{panic_message, Error, FutureResult};
use crate::executor::SharedExecutor;
use crate::sync::Spinlock;

/// Callback receiving the terminal result of a future.
pub type ResultCallback<T> = Box<dyn FnOnce(FutureResult<T>) + Send + 'static>;

struct Awaiter<T> {
    callback: ResultCallback<T>,
    executor: Option<SharedExecutor>,
}

enum State<T> {
    // Awaiters only exist while pending; settling moves them out.
    Pending(Vec<Awaiter<T>>),
    Fulfilled(T),
    Failed(Error),
}

/// The single-assignment cell shared by a `Promise` and its `Future`s.
///
/// The state and the awaiter list live under one lock. Settling swaps the
/// state and takes the awaiters in the same critical section, registration
/// either appends under that lock or reads the settled result under it. No
/// awaiter can be lost between the two, and none runs twice. Callbacks
/// themselves always run after the lock is released.
pub struct ResultCell<T> {
    state: Spinlock<State<T>>,
}

impl<T> ResultCell<T>
    where T: Clone + Send + 'static
{
    pub fn new() -> ResultCell<T> {
        ResultCell { state: Spinlock::new(State::Pending(Vec::new())) }
    }

    /// A cell that is settled from the start.
    pub fn with_result(result: FutureResult<T>) -> ResultCell<T> {
        let state = match result {
            Ok(value) => State::Fulfilled(value),
            Err(error) => State::Failed(error),
        };
        ResultCell { state: Spinlock::new(state) }
    }

    /// Run `callback` with the terminal result, now if the cell is settled,
    /// otherwise once it settles.
    pub fn complete_or_await(&self, executor: Option<&SharedExecutor>, callback: ResultCallback<T>) {
        let result = {
            let mut state = self.state.lock();
            match *state {
                State::Pending(ref mut awaiters) => {
                    awaiters.push(Awaiter {
                        callback,
                        executor: executor.cloned(),
                    });
                    return;
                }
                State::Fulfilled(ref value) => Ok(value.clone()),
                State::Failed(ref error) => Err(error.clone()),
            }
        };

        dispatch(executor, callback, result);
    }

    /// Settle the cell. Only the first call has an effect, later ones are ignored.
    pub fn complete(&self, result: FutureResult<T>) {
        // Cloned before locking; a panicking `T::clone` leaves the cell untouched.
        let settled = match result {
            Ok(ref value) => State::Fulfilled(value.clone()),
            Err(ref error) => State::Failed(error.clone()),
        };

        let awaiters = {
            let mut state = self.state.lock();
            match *state {
                State::Pending(..) => {}
                _ => {
                    trace!("ignoring completion of an already settled cell");
                    return;
                }
            }

            match mem::replace(&mut *state, settled) {
                State::Pending(awaiters) => awaiters,
                _ => Vec::new(),
            }
        };

        trace!("cell settled, draining {} awaiter(s)", awaiters.len());

        for awaiter in awaiters {
            dispatch(awaiter.executor.as_ref(), awaiter.callback, result.clone());
        }
    }

    pub fn is_completed(&self) -> bool {
        match *self.state.lock() {
            State::Pending(..) => false,
            _ => true,
        }
    }

    /// Number of registered awaiters still waiting.
    #[cfg(test)]
    pub(crate) fn waiting(&self) -> usize {
        match *self.state.lock() {
            State::Pending(ref awaiters) => awaiters.len(),
            _ => 0,
        }
    }
}

impl<T> Default for ResultCell<T>
    where T: Clone + Send + 'static
{
    fn default() -> ResultCell<T> {
        ResultCell::new()
    }
}

impl<T> fmt::Debug for ResultCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state.try_lock() {
            Some(state) => state,
            None => return write!(f, "ResultCell(<locked>)"),
        };

        match *state {
            State::Pending(ref awaiters) => write!(f, "ResultCell(Pending, {} awaiters)", awaiters.len()),
            State::Fulfilled(..) => write!(f, "ResultCell(Fulfilled)"),
            State::Failed(ref error) => write!(f, "ResultCell(Failed({}))", error),
        }
    }
}

/// Invoke `callback` with `result`, inline or through `executor`.
///
/// An inline callback that panics is logged and swallowed, so the caller can
/// go on to the next awaiter.
pub(crate) fn dispatch<T>(executor: Option<&SharedExecutor>,
                          callback: ResultCallback<T>,
                          result: FutureResult<T>)
    where T: Send + 'static
{
    match executor {
        Some(executor) => executor.execute(Box::new(move || callback(result))),
        None => {
            if let Err(cause) = panic::catch_unwind(AssertUnwindSafe(move || callback(result))) {
                error!("Callback panicked: {}", panic_message(&*cause));
            }
        }
    }
}
