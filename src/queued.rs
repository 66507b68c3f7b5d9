//! Shared-queue execution: the chunk sits behind a cursor and every worker
//! draws one item at a time until exhaustion.
//!
//! Two cursor flavours share the coordinator: one serializes the draw
//! behind a mutex, the other advances a single atomic counter, confining
//! contention to the cache line that counter lives on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::constants::TIMING_ENABLED;
use crate::preassigned::collect_timing;
use crate::sync::Rendezvous;
use crate::timer::Timer;
use crate::timing::Report;
use crate::work::Chunk;
use crate::worker::{Outputs, RoundResult, WorkerHandle};

/// A monotonically advancing index into the current chunk. `next` returns
/// each in-bounds index exactly once per round; indices at or past the
/// limit mean the chunk is exhausted.
pub trait Cursor: Send + Sync + 'static {
    fn new() -> Self;

    /// Rearms the cursor for a fresh chunk. Only called while no worker is
    /// drawing.
    fn reset(&self);

    fn next(&self, limit: usize) -> Option<usize>;
}

/// One lock acquisition per item drawn.
pub struct LockedCursor {
    idx: Mutex<usize>,
}

impl Cursor for LockedCursor {
    fn new() -> Self {
        LockedCursor { idx: Mutex::new(0) }
    }

    fn reset(&self) {
        *self.idx.lock().unwrap() = 0;
    }

    fn next(&self, limit: usize) -> Option<usize> {
        let mut idx = self.idx.lock().unwrap();
        if *idx >= limit {
            return None;
        }
        let i = *idx;
        *idx += 1;
        Some(i)
    }
}

/// Lock-free draw via fetch-and-add.
pub struct AtomicCursor {
    idx: AtomicUsize,
}

impl Cursor for AtomicCursor {
    fn new() -> Self {
        AtomicCursor {
            idx: AtomicUsize::new(0),
        }
    }

    fn reset(&self) {
        self.idx.store(0, Ordering::Release);
    }

    fn next(&self, limit: usize) -> Option<usize> {
        let i = self.idx.fetch_add(1, Ordering::AcqRel);
        if i >= limit {
            return None;
        }
        Some(i)
    }
}

/// The chunk currently being drawn from, plus its cursor. The chunk slot
/// is only replaced between rounds, while every worker is idle.
struct Feed<C> {
    chunk: Mutex<Option<Chunk>>,
    cursor: C,
}

impl<C: Cursor> Feed<C> {
    fn new() -> Self {
        Feed {
            chunk: Mutex::new(None),
            cursor: C::new(),
        }
    }

    fn publish(&self, chunk: Chunk) {
        let mut slot = self.chunk.lock().unwrap();
        self.cursor.reset();
        *slot = Some(chunk);
    }

    fn current(&self) -> Chunk {
        self.chunk.lock().unwrap().clone().unwrap()
    }
}

pub struct QueuedExecutor<C: Cursor> {
    workers: Vec<WorkerHandle<()>>,
    outputs: Arc<Outputs>,
    gate: Arc<Rendezvous>,
    feed: Arc<Feed<C>>,
}

/// Shared cursor guarded by a mutex; near-optimal load balance at the cost
/// of one lock acquisition per item.
pub type LockedQueueExecutor = QueuedExecutor<LockedCursor>;

/// Same contract, but the cursor is a fetch-and-add counter and the hot
/// path takes no lock.
pub type AtomicQueueExecutor = QueuedExecutor<AtomicCursor>;

impl<C: Cursor> QueuedExecutor<C> {
    pub fn new(num_workers: usize) -> Self {
        let gate = Arc::new(Rendezvous::new(num_workers));
        let outputs = Outputs::new(num_workers);
        let feed = Arc::new(Feed::<C>::new());

        let workers = (0..num_workers)
            .map(|i| {
                let feed = feed.clone();
                WorkerHandle::spawn(i, gate.clone(), outputs.clone(), move |_: ()| {
                    drain_feed(&feed)
                })
            })
            .collect();

        QueuedExecutor {
            workers,
            outputs,
            gate,
            feed,
        }
    }

    pub fn process(self, data: &[Chunk]) -> Report {
        let num_workers = self.workers.len();
        let mut total_timer = Timer::new();
        total_timer.mark();

        let mut timings = Vec::with_capacity(data.len());
        let mut chunk_timer = Timer::new();

        for chunk in data {
            if TIMING_ENABLED {
                chunk_timer.mark();
            }

            self.feed.publish(chunk.clone());
            for worker in &self.workers {
                worker.send(());
            }
            self.gate.wait_for_all_done();

            let chunk_time = chunk_timer.peek();

            if TIMING_ENABLED {
                timings.push(collect_timing(&self.outputs, chunk_time));
            }
        }

        let elapsed = total_timer.peek();
        let result = (0..num_workers).fold(0u32, |acc, i| {
            acc.wrapping_add(unsafe { self.outputs.slot(i).accumulation() })
        });

        Report {
            result,
            elapsed,
            timings,
        }
    }
}

fn drain_feed<C: Cursor>(feed: &Feed<C>) -> RoundResult {
    let chunk = feed.current();
    let items = &chunk[..];

    let mut sum = 0u32;
    let mut heavy = 0usize;
    while let Some(i) = feed.cursor.next(items.len()) {
        let item = &items[i];
        sum = sum.wrapping_add(item.process());
        heavy += item.heavy as usize;
    }
    RoundResult { sum, heavy }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work;
    use std::collections::HashSet;
    use std::thread;

    fn serial_sum(data: &[Chunk]) -> u32 {
        data.iter()
            .flat_map(|chunk| chunk.iter())
            .fold(0u32, |acc, item| acc.wrapping_add(item.process()))
    }

    fn drains_every_index_exactly_once<C: Cursor>() {
        let cursor = Arc::new(C::new());
        let limit = 10_000;

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cursor = cursor.clone();
                thread::spawn(move || {
                    let mut drawn = Vec::new();
                    while let Some(i) = cursor.next(limit) {
                        drawn.push(i);
                    }
                    drawn
                })
            })
            .collect();

        let mut seen = HashSet::new();
        let mut total = 0;
        for handle in handles {
            for i in handle.join().unwrap() {
                assert!(i < limit);
                assert!(seen.insert(i), "index {} drawn twice", i);
                total += 1;
            }
        }
        assert_eq!(total, limit);
    }

    #[test]
    fn locked_cursor_has_no_drops_or_duplicates() {
        drains_every_index_exactly_once::<LockedCursor>();
    }

    #[test]
    fn atomic_cursor_has_no_drops_or_duplicates() {
        drains_every_index_exactly_once::<AtomicCursor>();
    }

    #[test]
    fn cursor_reset_rearms_for_the_next_round() {
        let cursor = AtomicCursor::new();
        while cursor.next(5).is_some() {}
        cursor.reset();
        assert_eq!(cursor.next(5), Some(0));
    }

    #[test]
    fn locked_queue_matches_the_serial_reduction() {
        let data = work::generate_random(4, 64);
        let report = LockedQueueExecutor::new(4).process(&data);
        assert_eq!(report.result, serial_sum(&data));
    }

    #[test]
    fn atomic_queue_matches_the_serial_reduction() {
        let data = work::generate_stacked(4, 60);
        let report = AtomicQueueExecutor::new(4).process(&data);
        assert_eq!(report.result, serial_sum(&data));
    }

    #[test]
    fn heavy_counts_cover_the_chunk() {
        let data = work::generate_even(3, 80);
        let report = AtomicQueueExecutor::new(4).process(&data);
        for (timing, chunk) in report.timings.iter().zip(&data) {
            let expected = chunk.iter().filter(|item| item.heavy).count();
            assert_eq!(timing.heavy_count.iter().sum::<usize>(), expected);
        }
    }
}
