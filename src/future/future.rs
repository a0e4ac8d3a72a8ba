// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::sync::Arc;

use super::cell::{ResultCallback, ResultCell};
use super::FutureType;
use crate::error::{Error, FutureResult};
use crate::executor::SharedExecutor;

/// The read side of a `Promise`. Cheap to clone; clones observe the same cell.
pub struct Future<T>(Arc<ResultCell<T>>);

impl<T> Future<T>
    where T: Clone + Send + 'static
{
    pub fn with_cell(cell: Arc<ResultCell<T>>) -> Future<T> {
        Future(cell)
    }

    pub fn with_result(result: FutureResult<T>) -> Future<T> {
        Future(Arc::new(ResultCell::with_result(result)))
    }

    /// A future fulfilled with `val` from the start.
    pub fn resolved(val: T) -> Future<T> {
        Self::with_result(Ok(val))
    }

    /// A future failed with `err` from the start.
    pub fn rejected(err: Error) -> Future<T> {
        Self::with_result(Err(err))
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.0.is_completed()
    }

    #[cfg(test)]
    pub(crate) fn waiting(&self) -> usize {
        self.0.waiting()
    }
}

impl<T> FutureType for Future<T>
    where T: Clone + Send + 'static
{
    type Expectation = T;

    #[inline]
    fn complete_or_await(&self, executor: Option<&SharedExecutor>, callback: ResultCallback<T>) {
        self.0.complete_or_await(executor, callback)
    }
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Future<T> {
        Future(self.0.clone())
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Future({:?})", self.0)
    }
}
