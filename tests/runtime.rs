//! End-to-end behavior of the task runtime: pool, packaged tasks and the
//! promise/future pair working across real threads.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use spindle::{PackagedTask, Promise, ThreadPool};

#[test]
fn pool_round_trip() {
    let pool = ThreadPool::new(4);
    let x = 41;
    assert_eq!(pool.run(move || x + 1).get(), 42);
}

#[test]
fn failing_tasks_reraise_and_the_rest_deliver() {
    let pool = ThreadPool::new(4);

    let futures: Vec<_> = (0..40)
        .map(|i| {
            pool.run(move || -> String {
                if i % 4 == 0 {
                    panic!("task {} failed", i);
                }
                thread::current().name().unwrap_or("anonymous").to_string()
            })
        })
        .collect();

    pool.wait_for_all_done();

    let mut failures = 0;
    let mut names = HashSet::new();
    for future in futures {
        match catch_unwind(AssertUnwindSafe(|| future.get())) {
            Ok(name) => {
                names.insert(name);
            }
            Err(_) => failures += 1,
        }
    }

    assert_eq!(failures, 10);
    // Every successful task ran on one of the pool's four workers.
    assert!(!names.is_empty());
    assert!(names.len() <= 4);
}

#[test]
fn readiness_polling_observes_a_slow_task() {
    let pool = ThreadPool::new(4);
    let future = pool.run(|| {
        thread::sleep(Duration::from_millis(1_000));
        69
    });

    let mut unready_polls = 0;
    while !future.ready() {
        unready_polls += 1;
        thread::sleep(Duration::from_millis(50));
    }

    assert!(unready_polls >= 2);
    assert_eq!(future.get(), 69);
}

#[test]
fn promise_fulfilled_from_another_thread() {
    let mut promise = Promise::new();
    let future = promise.future();

    let producer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(400));
        promise.set(69);
    });

    assert_eq!(future.get(), 69);
    producer.join().unwrap();
}

#[test]
fn packaged_task_runs_detached() {
    let (task, future) = PackagedTask::new(|| {
        thread::sleep(Duration::from_millis(300));
        69 + 42_000
    });

    thread::spawn(move || task.invoke());
    assert_eq!(future.get(), 42_069);
}

#[test]
fn submissions_from_many_threads_all_deliver() {
    let pool = std::sync::Arc::new(ThreadPool::new(4));

    let submitters: Vec<_> = (0..8)
        .map(|base| {
            let pool = pool.clone();
            thread::spawn(move || {
                let futures: Vec<_> = (0..16).map(|i| pool.run(move || base * 100 + i)).collect();
                futures.into_iter().map(|f| f.get()).collect::<Vec<i32>>()
            })
        })
        .collect();

    for (base, submitter) in submitters.into_iter().enumerate() {
        let values = submitter.join().unwrap();
        let expected: Vec<i32> = (0..16).map(|i| base as i32 * 100 + i).collect();
        assert_eq!(values, expected);
    }
}
