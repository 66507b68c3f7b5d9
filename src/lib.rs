//! A study of parallel execution strategies over chunked workloads, and the
//! general-purpose task runtime that grew out of it.
//!
//! The chunked side compares three ways of spreading homogeneous work items
//! across a fixed set of worker threads:
//! - pre-assigned partitioning: zero coordination inside the inner loop,
//!   bounded by the slowest sub-range,
//! - a shared queue behind a mutex: near-optimal balance, one lock
//!   acquisition per item,
//! - a shared queue behind an atomic counter: the same balance with
//!   contention confined to one cache line.
//!
//! Every run instruments per-worker busy time and heavy-item counts per
//! chunk, which the binary renders as CSV.
//!
//! The runtime side is a fixed-size thread pool accepting arbitrary
//! callables, with a promise/future pair carrying either a typed value or a
//! failure captured on the worker and re-raised at the consumer.

pub mod constants;
pub mod oneshot;
pub mod pool;
pub mod preassigned;
pub mod queued;
pub mod sync;
pub mod task;
pub mod timer;
pub mod timing;
pub mod work;

mod worker;

pub use oneshot::{Failure, Future, Promise};
pub use pool::ThreadPool;
pub use preassigned::PreassignedExecutor;
pub use queued::{AtomicCursor, AtomicQueueExecutor, Cursor, LockedCursor, LockedQueueExecutor, QueuedExecutor};
pub use sync::Rendezvous;
pub use task::PackagedTask;
pub use timer::Timer;
pub use timing::{ChunkTiming, Report};
pub use work::{Chunk, Dataset, WorkItem};
