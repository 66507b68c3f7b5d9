//! The synthetic workload: an opaque unit of compute with a deterministic
//! result, and generators for datasets with different heavy-item placements.

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use rand::distributions::{Bernoulli, Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{HEAVY_ITERATIONS, LIGHT_ITERATIONS, PROBABILITY_HEAVY};

// Fixed seed so the random dataset (and therefore the final result) is
// stable across runs.
const DATA_SEED: u64 = 12345;

/// One unit of compute. `heavy` items run ten times more iterations than
/// light ones.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct WorkItem {
    pub val: f64,
    pub heavy: bool,
}

impl WorkItem {
    /// Deterministic given `val` and `heavy`. The inner loop keeps the
    /// intermediate bounded to [0, 10) so the final exponential fits a u32.
    pub fn process(&self) -> u32 {
        let iterations = if self.heavy {
            HEAVY_ITERATIONS
        } else {
            LIGHT_ITERATIONS
        };
        let mut intermediate = self.val;
        for _ in 0..iterations {
            let digits = ((intermediate.cos() * PI).sin().abs() * 10_000_000.0) as u32 % 100_000;
            intermediate = f64::from(digits) / 10_000.0;
        }
        intermediate.exp() as u32
    }
}

/// Chunks are shared with the workers for the duration of a round, so they
/// live behind an `Arc`.
pub type Chunk = Arc<Vec<WorkItem>>;

pub type Dataset = Vec<Chunk>;

/// `heavy` sampled i.i.d. Bernoulli(`PROBABILITY_HEAVY`).
pub fn generate_random(chunk_count: usize, chunk_size: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(DATA_SEED);
    let heavy_dist = Bernoulli::new(PROBABILITY_HEAVY).unwrap();
    let val_dist = Uniform::new(0.0, TAU);

    (0..chunk_count)
        .map(|_| {
            Arc::new(
                (0..chunk_size)
                    .map(|_| WorkItem {
                        val: val_dist.sample(&mut rng),
                        heavy: heavy_dist.sample(&mut rng),
                    })
                    .collect(),
            )
        })
        .collect()
}

/// Heavy items spread deterministically at ratio `PROBABILITY_HEAVY`: a
/// running accumulator marks every item that carries it past 1.0.
pub fn generate_even(chunk_count: usize, chunk_size: usize) -> Dataset {
    even_chunks(chunk_count, chunk_size)
        .into_iter()
        .map(Arc::new)
        .collect()
}

/// The even dataset with each chunk reordered so the heavy items sit
/// contiguously at the front.
pub fn generate_stacked(chunk_count: usize, chunk_size: usize) -> Dataset {
    let mut chunks = even_chunks(chunk_count, chunk_size);
    for chunk in &mut chunks {
        // Stable, so the val order within each class is preserved.
        chunk.sort_by_key(|item| !item.heavy);
    }
    chunks.into_iter().map(Arc::new).collect()
}

fn even_chunks(chunk_count: usize, chunk_size: usize) -> Vec<Vec<WorkItem>> {
    let mut rng = StdRng::seed_from_u64(DATA_SEED);
    let val_dist = Uniform::new(0.0, TAU);

    (0..chunk_count)
        .map(|_| {
            let mut acc = 0.0;
            (0..chunk_size)
                .map(|_| {
                    acc += PROBABILITY_HEAVY;
                    let heavy = acc >= 1.0;
                    if heavy {
                        acc -= 1.0;
                    }
                    WorkItem {
                        val: val_dist.sample(&mut rng),
                        heavy,
                    }
                })
                .collect()
        })
        .collect()
}
