// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

extern crate cofuture;
extern crate num_cpus;

use cofuture::{FutureType, Promise};
use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Instant;

const NS_PER_MS: usize = 1_000_000;

#[derive(Clone, Copy)]
struct Result {
    duration: usize,
    iters: usize,
}

#[inline]
fn rdiv(a: usize, b: usize) -> usize {
    (a + (b / 2)) / b
}

// Every thread registers awaiters on a shared batch of promises and races
// the others to complete them. Measures the cost of one register+complete
// pair under contention on the same cells.
fn run_test(thread_count: usize) -> Vec<Result> {
    const ROUNDS: usize = 2_000;
    const AWAITERS_PER_ROUND: usize = 64;
    const EMPTY: Result = Result {
        duration: 0,
        iters: 0,
    };

    let barriers = Arc::new(Barrier::new(thread_count));
    let fired = Arc::new(AtomicUsize::new(0));
    let promises: Arc<Vec<Promise<usize>>> = Arc::new((0..ROUNDS).map(|_| Promise::new()).collect());
    let results = Arc::new(Mutex::new(Vec::new()));
    let mut threads = Vec::with_capacity(thread_count);

    results.lock().unwrap().resize(thread_count, EMPTY);

    for i in 0..thread_count {
        let barriers = barriers.clone();
        let fired = fired.clone();
        let promises = promises.clone();
        let results = results.clone();

        threads.push(thread::spawn(move || {
            barriers.wait();

            let beg = Instant::now();
            let mut cnt = 0usize;

            for promise in promises.iter() {
                let future = promise.future();
                for _ in 0..AWAITERS_PER_ROUND {
                    let fired = fired.clone();
                    future.then(None, move |_| {
                        fired.fetch_add(1, Ordering::Relaxed);
                    });
                    cnt += 1;
                }
                promise.complete(i);
            }

            let dur = beg.elapsed();
            let dur = dur.as_secs() as usize * 1_000_000_000 + dur.subsec_nanos() as usize;

            results.lock().unwrap()[i] = Result {
                duration: dur,
                iters: cnt,
            };
        }));
    }

    for t in threads.drain(..) {
        t.join().unwrap();
    }

    assert_eq!(fired.load(Ordering::SeqCst), thread_count * ROUNDS * AWAITERS_PER_ROUND);

    let mut results = results.lock().unwrap();
    mem::replace(&mut *results, Vec::new())
}

// Run this benchmark with
//   cargo bench --bench contention -- --csv
// to get a parsable output.
// The first column will contain the thread count for that data plot and
// the second column will contain the ns/iter.
fn main() {
    let csv = std::env::args().any(|arg| arg == "--csv");

    for i in 1..(num_cpus::get() + 1) {
        let results = run_test(i);

        if csv {
            for r in results.iter() {
                println!("{};{}", i, rdiv(r.duration, r.iters));
            }
        } else {
            let perf_sum = results.iter().fold(0, |acc, r| acc + rdiv(r.duration, r.iters));
            let perf_avg = rdiv(perf_sum, results.len());
            let deviation_sum = results.iter().fold(0, |acc, r| {
                let avg = perf_avg as isize;
                let perf = rdiv(r.duration, r.iters) as isize;
                let diff = avg - perf;
                acc + (diff * diff) as usize
            });
            let variance = rdiv(deviation_sum, results.len());

            println!("\n==== {} Threads ====\n", i);

            for (i, r) in results.iter().enumerate() {
                println!("Thread {}: {} awaiters in {} ms => {} ns/iter",
                         i,
                         r.iters,
                         rdiv(r.duration, NS_PER_MS),
                         rdiv(r.duration, r.iters));
            }

            println!("Avg: {} ns/iter, Var: {}", perf_avg, variance);
        }
    }
}
