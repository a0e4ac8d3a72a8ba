// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Collapse a sequence of futures into a future of a sequence
//!
//! `Flatten` and `FlattenLazy` await elements strictly one after another:
//! interest in element `i + 1` is only registered once element `i` has been
//! fulfilled. The total wait is therefore the sum of the elements' waits, not
//! the maximum. Results keep input order whatever order the elements settle
//! in, and the first element *in input order* that fails fails the whole
//! sequence; nothing after it is looked at.
//!
//! Elements that are already settled are consumed in a loop on the current
//! stack. Only a pending element parks the walk; its callback picks it up
//! again from wherever that element gets settled.
//!
//! `FlattenConcurrent` registers on every element at once instead. The wait
//! is the maximum of the elements' waits, results still keep input order,
//! and the first element to fail *in time* decides the error.

use std::mem;
use std::sync::Arc;

use super::{Future, FutureType, Promise};
use crate::error::FutureResult;
use crate::executor::SharedExecutor;
use crate::sync::Spinlock;

/// Sequential flatten over futures.
///
/// Call it on a collection (`Vec`, array, ...) rather than on an iterator,
/// where `Iterator::flatten` would shadow it.
pub trait Flatten<T> {
    fn flatten(self, executor: Option<&SharedExecutor>) -> Future<Vec<T>>;
}

/// Sequential flatten over closures that start an operation and return its
/// future. A closure is not called until every element before it has been
/// fulfilled, so a failure stops the remaining operations from starting.
pub trait FlattenLazy<T> {
    fn flatten_lazy(self, executor: Option<&SharedExecutor>) -> Future<Vec<T>>;
}

/// Flatten that awaits every element at the same time.
pub trait FlattenConcurrent<T> {
    fn flatten_concurrent(self, executor: Option<&SharedExecutor>) -> Future<Vec<T>>;
}

impl<I, F> Flatten<F::Expectation> for I
    where I: IntoIterator<Item = F>,
          I::IntoIter: Send + 'static,
          F: FutureType
{
    fn flatten(self, executor: Option<&SharedExecutor>) -> Future<Vec<F::Expectation>> {
        Walk::start(self.into_iter(), executor, |f| f)
    }
}

impl<I, L, F> FlattenLazy<F::Expectation> for I
    where I: IntoIterator<Item = L>,
          I::IntoIter: Send + 'static,
          L: FnOnce() -> F,
          F: FutureType
{
    fn flatten_lazy(self, executor: Option<&SharedExecutor>) -> Future<Vec<F::Expectation>> {
        Walk::start(self.into_iter(), executor, |start: L| start())
    }
}

impl<I, F> FlattenConcurrent<F::Expectation> for I
    where I: IntoIterator<Item = F>,
          F: FutureType
{
    fn flatten_concurrent(self, executor: Option<&SharedExecutor>) -> Future<Vec<F::Expectation>> {
        let futures: Vec<F> = self.into_iter().collect();
        let promise = Promise::new();
        let future = promise.future();

        if futures.is_empty() {
            promise.complete(Vec::new());
            return future;
        }

        let gather = Arc::new(Spinlock::new(Gather {
            slots: futures.iter().map(|_| None).collect(),
            remaining: futures.len(),
        }));

        for (index, element) in futures.iter().enumerate() {
            let gather = gather.clone();
            let promise = promise.clone();
            element.complete_or_await(executor, Box::new(move |result| {
                match result {
                    Ok(value) => {
                        let filled = gather.lock().fill(index, value);
                        if let Some(values) = filled {
                            promise.complete(values);
                        }
                    }
                    Err(error) => {
                        trace!("concurrent flatten failed at element {} with {}", index, error);
                        promise.fail(error);
                    }
                }
            }));
        }

        future
    }
}

/// Indexed result slots for `flatten_concurrent`.
struct Gather<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T> Gather<T> {
    /// Store the value for `index`; hands back every value once the last
    /// slot is filled.
    fn fill(&mut self, index: usize, value: T) -> Option<Vec<T>> {
        self.slots[index] = Some(value);
        self.remaining -= 1;

        if self.remaining == 0 {
            Some(self.slots.drain(..).flatten().collect())
        } else {
            None
        }
    }
}

/// State of a sequential flatten between elements.
struct Walk<I, T, S> {
    pending: I,
    elements: Vec<T>,
    promise: Promise<Vec<T>>,
    executor: Option<SharedExecutor>,
    start: S,
}

/// Meeting point between a walk and the callback of the element it is
/// waiting on. Whichever side arrives second carries on.
enum Handoff<W, T> {
    Registering,
    Ready(FutureResult<T>),
    Parked(W),
    Done,
}

impl<I, T, S> Walk<I, T, S>
    where I: Iterator + Send + 'static,
          T: Clone + Send + 'static,
          S: Send + 'static
{
    fn start<F>(pending: I, executor: Option<&SharedExecutor>, start: S) -> Future<Vec<T>>
        where S: Fn(I::Item) -> F,
              F: FutureType<Expectation = T>
    {
        let promise = Promise::new();
        let future = promise.future();

        let walk = Walk {
            elements: Vec::with_capacity(pending.size_hint().0),
            pending,
            promise,
            executor: executor.cloned(),
            start,
        };
        walk.run();

        future
    }

    /// Consume settled elements until one is still pending or the sequence
    /// ends.
    fn run<F>(self)
        where S: Fn(I::Item) -> F,
              F: FutureType<Expectation = T>
    {
        let mut walk = self;
        loop {
            let next = match walk.pending.next() {
                Some(item) => (walk.start)(item),
                None => {
                    return walk.promise.complete(walk.elements);
                }
            };

            let handoff = Arc::new(Spinlock::new(Handoff::Registering));
            let remote = handoff.clone();
            next.complete_or_await(walk.executor.as_ref(), Box::new(move |result| {
                let parked: Walk<I, T, S> = {
                    let mut slot = remote.lock();
                    match mem::replace(&mut *slot, Handoff::Done) {
                        Handoff::Parked(parked) => parked,
                        _ => {
                            *slot = Handoff::Ready(result);
                            return;
                        }
                    }
                };

                if let Some(parked) = parked.accept(result) {
                    parked.run();
                }
            }));

            let result = {
                let mut slot = handoff.lock();
                match mem::replace(&mut *slot, Handoff::Done) {
                    Handoff::Ready(result) => result,
                    _ => {
                        *slot = Handoff::Parked(walk);
                        return;
                    }
                }
            };

            walk = match walk.accept(result) {
                Some(walk) => walk,
                None => return,
            };
        }
    }

    /// Record one element's result. Gives the walk back if it goes on.
    fn accept(mut self, result: FutureResult<T>) -> Option<Self> {
        match result {
            Ok(value) => {
                self.elements.push(value);
                Some(self)
            }
            Err(error) => {
                trace!("flatten stopped at element {} with {}", self.elements.len(), error);
                self.promise.fail(error);
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::error::Error;
    use crate::executor::ManualExecutor;

    #[test]
    fn empty_completes_immediately() {
        let futures: Vec<Future<u8>> = Vec::new();
        let flat = futures.flatten(None);
        assert!(flat.is_completed());
        assert_eq!(flat.sync(None).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn input_order_not_completion_order() {
        let promises: Vec<Promise<&str>> = (0..3).map(|_| Promise::new()).collect();
        let flat = promises.iter().map(Promise::future).collect::<Vec<_>>().flatten(None);

        promises[2].complete("c");
        promises[0].complete("a");
        assert!(!flat.is_completed());
        promises[1].complete("b");

        assert_eq!(flat.sync(None).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn registers_one_element_at_a_time() {
        let first = Promise::<u8>::new();
        let second = Promise::<u8>::new();
        let flat = vec![first.future(), second.future()].flatten(None);

        assert_eq!(first.future().waiting(), 1);
        assert_eq!(second.future().waiting(), 0);

        first.complete(1);
        assert_eq!(second.future().waiting(), 1);

        second.complete(2);
        assert_eq!(flat.sync(None).unwrap(), vec![1, 2]);
    }

    #[test]
    fn first_failure_in_input_order_wins() {
        let first = Promise::<u8>::new();
        let second = Promise::<u8>::new();
        let flat = vec![first.future(), second.future()].flatten(None);

        // A later element failing first does not decide the outcome.
        second.fail(Error::new("second"));
        assert!(!flat.is_completed());

        first.fail(Error::new("first"));
        assert_eq!(flat.sync(None).unwrap_err().to_string(), "first");
    }

    #[test]
    fn failure_skips_remaining_elements() {
        let first = Promise::<u8>::new();
        let second = Promise::<u8>::new();
        let flat = vec![first.future(), second.future()].flatten(None);

        first.fail(Error::new("boom"));
        assert_eq!(flat.sync(None).unwrap_err().to_string(), "boom");
        assert_eq!(second.future().waiting(), 0);
    }

    #[test]
    fn lazy_does_not_start_after_failure() {
        let started = Arc::new(AtomicUsize::new(0));

        let s1 = started.clone();
        let s2 = started.clone();
        let ops: Vec<Box<dyn FnOnce() -> Future<u8> + Send>> = vec![
            Box::new(move || {
                s1.fetch_add(1, Ordering::SeqCst);
                Future::rejected(Error::new("first op failed"))
            }),
            Box::new(move || {
                s2.fetch_add(1, Ordering::SeqCst);
                Future::resolved(2)
            }),
        ];

        let flat = ops.flatten_lazy(None);
        assert_eq!(flat.sync(None).unwrap_err().to_string(), "first op failed");
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lazy_runs_in_order() {
        let ops: Vec<Box<dyn FnOnce() -> Future<usize> + Send>> = (0..5usize)
            .map(|i| Box::new(move || Future::resolved(i * 10)) as Box<dyn FnOnce() -> Future<usize> + Send>)
            .collect();
        assert_eq!(ops.flatten_lazy(None).sync(None).unwrap(), vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn steps_through_executor() {
        let manual = Arc::new(ManualExecutor::new());
        let exec: SharedExecutor = manual.clone();

        let flat = vec![Future::resolved(1), Future::resolved(2), Future::resolved(3)].flatten(Some(&exec));
        assert!(!flat.is_completed());

        // One job per element, each scheduling the next.
        assert_eq!(manual.run_pending(), 3);
        assert_eq!(flat.sync(None).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn long_settled_batch_runs_in_a_loop() {
        const LEN: usize = 100_000;

        let flat = (0..LEN).map(Future::resolved).collect::<Vec<_>>().flatten(None);
        let values = flat.sync(None).unwrap();
        assert_eq!(values.len(), LEN);
        assert_eq!(values[LEN - 1], LEN - 1);
    }

    #[test]
    fn long_settled_tail_behind_pending_head() {
        const LEN: usize = 100_000;

        let head = Promise::<usize>::new();
        let mut futures = vec![head.future()];
        futures.extend((1..LEN).map(Future::resolved));

        let flat = futures.flatten(None);
        assert!(!flat.is_completed());

        // The whole tail is consumed on this thread's stack.
        head.complete(0);
        let values = flat.sync(None).unwrap();
        assert_eq!(values.len(), LEN);
        assert!(values.iter().enumerate().all(|(i, v)| i == *v));
    }

    #[test]
    fn long_lazy_batch_runs_in_a_loop() {
        const LEN: usize = 100_000;

        let ops: Vec<_> = (0..LEN).map(|i| move || Future::resolved(i)).collect();
        assert_eq!(ops.flatten_lazy(None).sync(None).unwrap().len(), LEN);
    }

    #[test]
    fn concurrent_registers_on_every_element() {
        let promises: Vec<Promise<&str>> = (0..3).map(|_| Promise::new()).collect();
        let flat = promises.iter().map(Promise::future).collect::<Vec<_>>().flatten_concurrent(None);

        assert!(promises.iter().all(|p| p.future().waiting() == 1));

        promises[2].complete("c");
        promises[0].complete("a");
        assert!(!flat.is_completed());
        promises[1].complete("b");

        assert_eq!(flat.sync(None).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn concurrent_fails_on_first_error_in_time() {
        let first = Promise::<u8>::new();
        let second = Promise::<u8>::new();
        let flat = vec![first.future(), second.future()].flatten_concurrent(None);

        second.fail(Error::new("second"));
        assert!(flat.is_completed());
        assert_eq!(flat.sync(None).unwrap_err().to_string(), "second");

        first.fail(Error::new("first"));
        assert_eq!(flat.sync(None).unwrap_err().to_string(), "second");
    }

    #[test]
    fn concurrent_empty_and_settled() {
        let empty: Vec<Future<u8>> = Vec::new();
        assert_eq!(empty.flatten_concurrent(None).sync(None).unwrap(), Vec::<u8>::new());

        let flat = vec![Future::resolved(1), Future::resolved(2)].flatten_concurrent(None);
        assert_eq!(flat.sync(None).unwrap(), vec![1, 2]);
    }

    #[test]
    fn concurrent_through_executor() {
        let manual = Arc::new(ManualExecutor::new());
        let exec: SharedExecutor = manual.clone();

        let flat = vec![Future::resolved(1), Future::resolved(2), Future::resolved(3)]
            .flatten_concurrent(Some(&exec));
        assert!(!flat.is_completed());

        assert_eq!(manual.run_pending(), 3);
        assert_eq!(flat.sync(None).unwrap(), vec![1, 2, 3]);
    }
}
