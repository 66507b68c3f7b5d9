//! Compile-time configuration of the experiment harness.
//!
//! The executors and the pool take their worker count at construction; the
//! values here are the defaults the binary runs with.

pub const TIMING_ENABLED: bool = true;

pub const WORKER_COUNT: usize = 4;
pub const CHUNK_SIZE: usize = 8_000;
pub const CHUNK_COUNT: usize = 100;
pub const SUBSET_SIZE: usize = CHUNK_SIZE / WORKER_COUNT;

pub const LIGHT_ITERATIONS: usize = 100;
pub const HEAVY_ITERATIONS: usize = 1_000;
pub const PROBABILITY_HEAVY: f64 = 0.05;

const _: () = assert!(CHUNK_SIZE >= WORKER_COUNT);
const _: () = assert!(CHUNK_SIZE % WORKER_COUNT == 0);
