//! Worker threads shared by the chunked executors.
//!
//! Each worker owns a private inbox (job slot plus terminate flag) and a
//! cache-padded output slot. The accumulator lives on the worker's stack
//! for the whole thread lifetime, so nothing in the per-item hot loop
//! touches shared memory.

use std::cell::UnsafeCell;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use crossbeam_utils::CachePadded;

use crate::constants::TIMING_ENABLED;
use crate::sync::Rendezvous;
use crate::timer::Timer;

/// What one worker produced over one round.
pub(crate) struct RoundResult {
    pub sum: u32,
    pub heavy: usize,
}

/// Results published by a worker at the end of each round.
///
/// Single-writer single-reader: the owning worker writes before it signals
/// the rendezvous, the coordinator reads after the wait returns. The
/// rendezvous mutex provides the happens-before edge, so no further
/// synchronization is needed here.
pub(crate) struct WorkerSlot {
    accumulation: UnsafeCell<u32>,
    work_time: UnsafeCell<f32>,
    heavy_count: UnsafeCell<usize>,
}

unsafe impl Sync for WorkerSlot {}

impl WorkerSlot {
    fn new() -> Self {
        WorkerSlot {
            accumulation: UnsafeCell::new(0),
            work_time: UnsafeCell::new(0.0),
            heavy_count: UnsafeCell::new(0),
        }
    }

    /// Safety: only the owning worker may call this, and only between
    /// consuming a job and signalling the rendezvous.
    unsafe fn publish(&self, accumulation: u32, work_time: f32, heavy_count: usize) {
        *self.accumulation.get() = accumulation;
        *self.work_time.get() = work_time;
        *self.heavy_count.get() = heavy_count;
    }

    /// Safety: only the coordinator may call this, and only after
    /// `wait_for_all_done` has returned for the round in question.
    pub(crate) unsafe fn accumulation(&self) -> u32 {
        *self.accumulation.get()
    }

    pub(crate) unsafe fn work_time(&self) -> f32 {
        *self.work_time.get()
    }

    pub(crate) unsafe fn heavy_count(&self) -> usize {
        *self.heavy_count.get()
    }
}

/// One padded slot per worker so the hot state of adjacent workers never
/// shares a cache line.
pub(crate) struct Outputs {
    slots: Vec<CachePadded<WorkerSlot>>,
}

impl Outputs {
    pub fn new(num_workers: usize) -> Arc<Self> {
        Arc::new(Outputs {
            slots: (0..num_workers)
                .map(|_| CachePadded::new(WorkerSlot::new()))
                .collect(),
        })
    }

    pub fn slot(&self, index: usize) -> &WorkerSlot {
        &self.slots[index]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

struct InboxState<J> {
    job: Option<J>,
    terminate: bool,
}

/// The wake predicate is "job slot non-empty or terminate set"; terminate
/// wins when both hold.
struct Inbox<J> {
    state: Mutex<InboxState<J>>,
    cond: Condvar,
}

impl<J> Inbox<J> {
    fn new() -> Self {
        Inbox {
            state: Mutex::new(InboxState {
                job: None,
                terminate: false,
            }),
            cond: Condvar::new(),
        }
    }

    fn next_job(&self) -> Option<J> {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.terminate {
                return None;
            }
            if let Some(job) = state.job.take() {
                return Some(job);
            }
            state = self.cond.wait(state).unwrap();
        }
    }

    fn send(&self, job: J) {
        {
            let mut state = self.state.lock().unwrap();
            debug_assert!(state.job.is_none(), "worker already has a pending job");
            state.job = Some(job);
        }
        self.cond.notify_one();
    }

    fn terminate(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.terminate = true;
        }
        self.cond.notify_one();
    }
}

/// Owning handle to one worker thread. Dropping it terminates and joins
/// the thread.
pub(crate) struct WorkerHandle<J> {
    inbox: Arc<Inbox<J>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl<J: Send + 'static> WorkerHandle<J> {
    /// Spawns a worker that runs `process` once per delivered job, then
    /// publishes its output slot and signals the rendezvous.
    pub fn spawn<F>(
        index: usize,
        gate: Arc<Rendezvous>,
        outputs: Arc<Outputs>,
        mut process: F,
    ) -> Self
    where
        F: FnMut(J) -> RoundResult + Send + 'static,
    {
        let inbox = Arc::new(Inbox::new());
        let worker_inbox = inbox.clone();

        let thread = thread::Builder::new()
            .name(format!("spindle-worker-{}", index))
            .spawn(move || {
                profiling::register_thread!("Worker");

                let mut accumulation = 0u32;
                let mut timer = Timer::new();

                while let Some(job) = worker_inbox.next_job() {
                    profiling::scope!("round");

                    if TIMING_ENABLED {
                        timer.mark();
                    }
                    let round = process(job);
                    let work_time = if TIMING_ENABLED { timer.peek() } else { 0.0 };

                    accumulation = accumulation.wrapping_add(round.sum);
                    unsafe {
                        outputs
                            .slot(index)
                            .publish(accumulation, work_time, round.heavy);
                    }
                    gate.signal_done();
                }
            })
            .unwrap();

        WorkerHandle {
            inbox,
            thread: Some(thread),
        }
    }

    pub fn send(&self, job: J) {
        self.inbox.send(job);
    }
}

impl<J> Drop for WorkerHandle<J> {
    fn drop(&mut self) {
        self.inbox.terminate();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_rounds_accumulate_and_signal() {
        let gate = Arc::new(Rendezvous::new(1));
        let outputs = Outputs::new(1);
        let worker = WorkerHandle::spawn(0, gate.clone(), outputs.clone(), |job: u32| {
            RoundResult {
                sum: job,
                heavy: job as usize % 2,
            }
        });

        worker.send(3);
        gate.wait_for_all_done();
        assert_eq!(unsafe { outputs.slot(0).accumulation() }, 3);

        worker.send(4);
        gate.wait_for_all_done();
        assert_eq!(unsafe { outputs.slot(0).accumulation() }, 7);
        assert_eq!(unsafe { outputs.slot(0).heavy_count() }, 0);
    }

    #[test]
    fn dropping_the_handle_stops_an_idle_worker() {
        let gate = Arc::new(Rendezvous::new(1));
        let outputs = Outputs::new(1);
        let worker =
            WorkerHandle::spawn(0, gate, outputs, |_: ()| RoundResult { sum: 0, heavy: 0 });
        drop(worker);
    }
}
