// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

extern crate cofuture;
extern crate env_logger;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cofuture::{Flatten, FutureType, Promise, SharedExecutor, ThreadPool};

fn main() {
    env_logger::init();

    let pool: SharedExecutor = Arc::new(ThreadPool::builder()
        .workers(4)
        .name("demo".to_owned())
        .build()
        .expect("failed to spawn workers"));

    // Three "queries" answered out of order by other threads.
    let promises: Vec<Promise<f64>> = (0..3).map(|_| Promise::new()).collect();
    for (i, promise) in promises.iter().enumerate().rev() {
        let promise = promise.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10 * (3 - i as u64)));
            promise.complete(1.23 * (i + 1) as f64);
        });
    }

    let total = promises
        .iter()
        .map(Promise::future)
        .collect::<Vec<_>>()
        .flatten(Some(&pool))
        .map(Some(&pool), |values| Ok(values.iter().sum::<f64>()));

    total
        .then(None, |sum| println!("sum = {}", sum))
        .catch(None, |err| println!("failed: {}", err));

    let r = total.sync_timeout(Duration::from_secs(1));
    assert!(r.is_ok());
}
