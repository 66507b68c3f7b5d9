//! A fixed set of long-lived workers draining a FIFO queue of packaged
//! tasks.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use crate::oneshot::Future;
use crate::task::PackagedTask;

struct PoolState {
    tasks: VecDeque<PackagedTask>,
    stopping: bool,
}

struct PoolShared {
    state: Mutex<PoolState>,
    // Workers wait on this for work or the stop request.
    task_ready: Condvar,
    // Broadcast whenever the queue is observed empty.
    drained: Condvar,
}

impl PoolShared {
    fn run_worker(&self) {
        loop {
            let task = {
                let mut state = self.state.lock().unwrap();
                loop {
                    if let Some(task) = state.tasks.pop_front() {
                        if state.tasks.is_empty() {
                            self.drained.notify_all();
                        }
                        break task;
                    }
                    if state.stopping {
                        return;
                    }
                    state = self.task_ready.wait(state).unwrap();
                }
            };

            profiling::scope!("task");
            // A failing task fulfils its future; it never unwinds into the
            // worker.
            task.invoke();
        }
    }
}

pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl ThreadPool {
    pub fn new(num_workers: usize) -> Self {
        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                tasks: VecDeque::new(),
                stopping: false,
            }),
            task_ready: Condvar::new(),
            drained: Condvar::new(),
        });

        let workers = (0..num_workers)
            .map(|i| {
                let shared = shared.clone();
                thread::Builder::new()
                    .name(format!("pool-worker-{}", i))
                    .spawn(move || {
                        profiling::register_thread!("PoolWorker");
                        shared.run_worker();
                    })
                    .unwrap()
            })
            .collect();

        ThreadPool { shared, workers }
    }

    /// Packages `f`, appends it to the queue and wakes one worker.
    /// Submission order is FIFO; completion order is not guaranteed.
    pub fn run<F, R>(&self, f: F) -> Future<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (task, future) = PackagedTask::new(f);
        {
            let mut state = self.shared.state.lock().unwrap();
            state.tasks.push_back(task);
        }
        self.shared.task_ready.notify_one();
        future
    }

    /// Blocks until the queue has been observed empty.
    ///
    /// This is a queue-drain signal only: tasks already handed to workers
    /// may still be executing when it returns. Completion of an individual
    /// task is observed through its future.
    pub fn wait_for_all_done(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while !state.tasks.is_empty() {
            state = self.shared.drained.wait(state).unwrap();
        }
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for ThreadPool {
    /// Two-phase cooperative stop: set the flag, wake every blocked
    /// worker, then join. Workers drain whatever is still queued before
    /// exiting.
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.stopping = true;
        }
        self.shared.task_ready.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
