// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;
use std::time::Instant;

use super::FutureType;
use crate::error::{Error, FutureResult};
use crate::sync::{MonoBarrier, MonoBarrierError};

/// Block until `future` settles or `deadline` passes.
///
/// The callback registered here stays attached after a timeout and will
/// still hand its result to the (by then abandoned) barrier.
pub(crate) fn blocking_wait<F>(future: &F, deadline: Option<Instant>) -> FutureResult<F::Expectation>
    where F: FutureType + ?Sized
{
    let barrier = Arc::new(MonoBarrier::new());

    {
        let barrier = barrier.clone();
        future.complete_or_await(None, Box::new(move |result| barrier.notify(result)));
    }

    match barrier.wait(deadline) {
        Ok(result) => result,
        Err(MonoBarrierError::TimedOut) => {
            debug!("sync timed out waiting for {}", std::any::type_name::<F::Expectation>());
            Err(Error::timeout::<F::Expectation>())
        }
        Err(err) => Err(Error::Barrier(err)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::thread;
    use std::time::Duration;

    use crate::future::{Future, Promise};

    #[test]
    fn already_completed_returns_immediately() {
        let future = Future::resolved(10);
        let start = Instant::now();
        assert_eq!(future.sync(Instant::now()).unwrap(), 10);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn waits_for_other_thread() {
        let promise = Promise::new();
        let future = promise.future();

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            promise.complete("test");
        });

        assert_eq!(future.sync(None).unwrap(), "test");
    }

    #[test]
    fn reraises_failure() {
        let promise = Promise::<()>::new();
        promise.fail(Error::new("failed"));
        assert_eq!(promise.future().sync(None).unwrap_err().to_string(), "failed");
    }

    #[test]
    fn timeout_leaves_future_usable() {
        let promise = Promise::<String>::new();
        let future = promise.future();

        let err = future.sync_timeout(Duration::from_millis(10)).unwrap_err();
        assert!(err.is_timeout());
        assert!(!future.is_completed());
        // The timed-out wait is still registered.
        assert_eq!(future.waiting(), 1);

        promise.complete("later".to_owned());
        assert_eq!(future.sync(None).unwrap(), "later");
    }
}
