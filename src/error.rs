// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors carried by futures

use std::any::Any;
use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use crate::sync::MonoBarrierError;

/// The terminal result handed to every awaiter.
pub type FutureResult<T> = Result<T, Error>;

/// Every failure a future can settle with.
///
/// Cloning is cheap: application errors are shared, since a single failure
/// is delivered to each registered awaiter.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// `sync` gave up before the future completed.
    #[error("timed out waiting for a future of `{expecting}`")]
    Timeout { expecting: &'static str },

    /// A `map` or `flat_map` transform panicked.
    #[error("transform panicked: {message}")]
    Panicked { message: String },

    /// The signal `sync` blocks on failed.
    #[error("blocking wait failed: {0}")]
    Barrier(#[from] MonoBarrierError),

    /// Anything a producer or transform failed with. Not interpreted here.
    #[error(transparent)]
    Application(Arc<dyn StdError + Send + Sync + 'static>),
}

impl Error {
    /// Wrap an application error.
    ///
    /// Accepts any error type as well as plain `&str` and `String` messages.
    pub fn new<E>(error: E) -> Error
        where E: Into<Box<dyn StdError + Send + Sync + 'static>>
    {
        Error::Application(Arc::from(error.into()))
    }

    pub(crate) fn timeout<T>() -> Error {
        Error::Timeout { expecting: std::any::type_name::<T>() }
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Error {
        Error::Panicked { message: panic_message(&*payload).to_owned() }
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        match *self {
            Error::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Borrow the wrapped application error as `E`, if that is what it is.
    pub fn downcast_ref<E>(&self) -> Option<&E>
        where E: StdError + 'static
    {
        match *self {
            Error::Application(ref inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// The message a panic was raised with, if it carried one.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    match payload.downcast_ref::<&'static str>() {
        Some(s) => *s,
        None => match payload.downcast_ref::<String>() {
            Some(s) => &s[..],
            None => "Box<Any>",
        },
    }
}
