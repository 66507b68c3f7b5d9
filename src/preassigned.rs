//! Pre-assigned execution: each chunk is sliced into equal disjoint
//! sub-ranges, one per worker, with no coordination inside the inner loop.
//!
//! The strategy is bounded by the slowest sub-range, which makes it
//! pathological when the heavy items are stacked into one worker's slice.

use std::ops::Range;
use std::sync::Arc;

use crate::constants::TIMING_ENABLED;
use crate::sync::Rendezvous;
use crate::timer::Timer;
use crate::timing::{ChunkTiming, Report};
use crate::work::Chunk;
use crate::worker::{Outputs, RoundResult, WorkerHandle};

/// A worker's job for one round: the chunk and the sub-range it owns.
type Slice = (Chunk, Range<usize>);

pub struct PreassignedExecutor {
    workers: Vec<WorkerHandle<Slice>>,
    outputs: Arc<Outputs>,
    gate: Arc<Rendezvous>,
}

impl PreassignedExecutor {
    pub fn new(num_workers: usize) -> Self {
        let gate = Arc::new(Rendezvous::new(num_workers));
        let outputs = Outputs::new(num_workers);

        let workers = (0..num_workers)
            .map(|i| {
                WorkerHandle::spawn(i, gate.clone(), outputs.clone(), process_slice)
            })
            .collect();

        PreassignedExecutor {
            workers,
            outputs,
            gate,
        }
    }

    /// Drives the workers over the dataset chunk by chunk and reports the
    /// wrapping sum of the per-worker accumulators.
    pub fn process(self, data: &[Chunk]) -> Report {
        let num_workers = self.workers.len();
        let mut total_timer = Timer::new();
        total_timer.mark();

        let mut timings = Vec::with_capacity(data.len());
        let mut chunk_timer = Timer::new();

        for chunk in data {
            assert!(chunk.len() >= num_workers && chunk.len() % num_workers == 0);
            let subset = chunk.len() / num_workers;

            if TIMING_ENABLED {
                chunk_timer.mark();
            }

            for (i, worker) in self.workers.iter().enumerate() {
                worker.send((chunk.clone(), i * subset..(i + 1) * subset));
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

fn process_slice((chunk, range): Slice) -> RoundResult {
    let mut sum = 0u32;
    let mut heavy = 0usize;
    for item in &chunk[range] {
        sum = sum.wrapping_add(item.process());
        heavy += item.heavy as usize;
    }
    RoundResult { sum, heavy }
}

pub(crate) fn collect_timing(outputs: &Outputs, chunk_time: f32) -> ChunkTiming {
    ChunkTiming {
        work_time: (0..outputs.len())
            .map(|i| unsafe { outputs.slot(i).work_time() })
            .collect(),
        heavy_count: (0..outputs.len())
            .map(|i| unsafe { outputs.slot(i).heavy_count() })
            .collect(),
        total_chunk_time: chunk_time,
    }
}
