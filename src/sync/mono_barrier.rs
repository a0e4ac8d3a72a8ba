// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! One-shot handoff between a single notifier and a single waiter

use std::fmt;
use std::mem;
use std::sync::{Condvar, Mutex};
use std::time::Instant;

use thiserror::Error;

enum State<T> {
    Empty,
    Waiting,
    Ready(T),
    Taken,
}

/// Carries exactly one value from `notify` to `wait`.
///
/// The notifier never blocks. The waiter blocks until the value arrives or
/// the optional deadline passes. Only one thread may wait at a time.
pub struct MonoBarrier<T> {
    lock: Mutex<State<T>>,
    cond: Condvar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MonoBarrierError {
    #[error("another thread is already waiting on this barrier")]
    Occupied,
    #[error("the barrier lock was poisoned")]
    Poisoned,
    #[error("the deadline elapsed before the barrier was notified")]
    TimedOut,
}

impl<T> MonoBarrier<T> {
    /// Create a new `MonoBarrier`
    pub fn new() -> MonoBarrier<T> {
        MonoBarrier {
            lock: Mutex::new(State::Empty),
            cond: Condvar::new(),
        }
    }

    /// Block until `notify` hands over a value, or until `deadline` passes.
    ///
    /// A `None` deadline waits forever. A value that was already handed over
    /// is returned without blocking, even if the deadline is in the past.
    pub fn wait(&self, deadline: Option<Instant>) -> Result<T, MonoBarrierError> {
        let mut guard = self.lock.lock().map_err(|_| MonoBarrierError::Poisoned)?;

        match *guard {
            State::Empty => *guard = State::Waiting,
            State::Ready(_) => {}
            State::Waiting | State::Taken => return Err(MonoBarrierError::Occupied),
        }

        loop {
            if let State::Ready(_) = *guard {
                return match mem::replace(&mut *guard, State::Taken) {
                    State::Ready(value) => Ok(value),
                    _ => Err(MonoBarrierError::Occupied),
                };
            }

            guard = match deadline {
                None => self.cond.wait(guard).map_err(|_| MonoBarrierError::Poisoned)?,
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        // Give the slot back so a later wait can still pick the value up.
                        *guard = State::Empty;
                        return Err(MonoBarrierError::TimedOut);
                    }

                    let (guard, _) = self
                        .cond
                        .wait_timeout(guard, deadline - now)
                        .map_err(|_| MonoBarrierError::Poisoned)?;
                    guard
                }
            };
        }
    }

    /// Hand `value` to the waiter, waking it if it is blocked.
    ///
    /// Only the first notification is kept.
    pub fn notify(&self, value: T) {
        let mut guard = match self.lock.lock() {
            Ok(guard) => guard,
            Err(_) => {
                error!("MonoBarrier lock poisoned, dropping notification");
                return;
            }
        };

        match *guard {
            State::Empty => *guard = State::Ready(value),
            State::Waiting => {
                *guard = State::Ready(value);
                self.cond.notify_one();
            }
            State::Ready(_) | State::Taken => {
                warn!("MonoBarrier notified more than once, ignoring");
            }
        }
    }
}

impl<T> Default for MonoBarrier<T> {
    fn default() -> MonoBarrier<T> {
        MonoBarrier::new()
    }
}

impl<T> fmt::Debug for MonoBarrier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = match self.lock.lock() {
            Ok(guard) => guard,
            Err(_) => return write!(f, "MonoBarrier(Poisoned)"),
        };

        match *guard {
            State::Empty => write!(f, "MonoBarrier(Empty)"),
            State::Waiting => write!(f, "MonoBarrier(Waiting)"),
            State::Ready(_) => write!(f, "MonoBarrier(Ready)"),
            State::Taken => write!(f, "MonoBarrier(Taken)"),
        }
    }
}
