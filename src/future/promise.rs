// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::sync::Arc;

use super::cell::ResultCell;
use super::Future;
use crate::error::{Error, FutureResult};

/// The write side of a future.
///
/// Clones share the same cell, so several producers may race to settle it.
/// Whichever call lands first wins; every later `complete` or `fail` is a
/// silent no-op. Callers cannot tell whether their own call won.
pub struct Promise<T> {
    cell: Arc<ResultCell<T>>,
}

impl<T> Promise<T>
    where T: Clone + Send + 'static
{
    pub fn new() -> Promise<T> {
        Promise { cell: Arc::new(ResultCell::new()) }
    }

    /// A read handle observing this promise.
    pub fn future(&self) -> Future<T> {
        Future::with_cell(self.cell.clone())
    }

    pub fn complete(&self, value: T) {
        self.cell.complete(Ok(value))
    }

    pub fn fail(&self, error: Error) {
        self.cell.complete(Err(error))
    }

    pub fn complete_with(&self, result: FutureResult<T>) {
        self.cell.complete(result)
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.cell.is_completed()
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Promise<T> {
        Promise { cell: self.cell.clone() }
    }
}

impl<T> Default for Promise<T>
    where T: Clone + Send + 'static
{
    fn default() -> Promise<T> {
        Promise::new()
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Promise({:?})", self.cell)
    }
}
