// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::cell::{dispatch, ResultCallback};
use super::FutureType;
use crate::error::{Error, FutureResult};
use crate::executor::SharedExecutor;

/// A result that is known up front.
///
/// Satisfies `FutureType` without a cell or a lock, so returning a constant
/// from an API that hands out futures costs nothing beyond the clone each
/// continuation receives.
#[derive(Debug, Clone)]
pub struct Ready<T>(FutureResult<T>);

impl<T> Ready<T> {
    pub fn new(result: FutureResult<T>) -> Ready<T> {
        Ready(result)
    }

    pub fn ok(val: T) -> Ready<T> {
        Ready(Ok(val))
    }

    pub fn err(err: Error) -> Ready<T> {
        Ready(Err(err))
    }

    pub fn into_inner(self) -> FutureResult<T> {
        self.0
    }
}

impl<T> FutureType for Ready<T>
    where T: Clone + Send + 'static
{
    type Expectation = T;

    fn complete_or_await(&self, executor: Option<&SharedExecutor>, callback: ResultCallback<T>) {
        dispatch(executor, callback, self.0.clone())
    }
}
