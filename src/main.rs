use clap::Parser;

use spindle::constants::{CHUNK_COUNT, CHUNK_SIZE, TIMING_ENABLED, WORKER_COUNT};
use spindle::{timing, work};
use spindle::{AtomicQueueExecutor, LockedQueueExecutor, PreassignedExecutor};

/// Compare parallel execution strategies over a chunked synthetic workload.
#[derive(Parser, Debug)]
struct Args {
    /// Stack the heavy items at the front of each chunk.
    #[arg(long)]
    stacked: bool,

    /// Spread the heavy items evenly through each chunk.
    #[arg(long)]
    even: bool,

    /// Draw items through a mutex-guarded shared queue.
    #[arg(long)]
    queued: bool,

    /// Draw items through an atomic-cursor shared queue.
    #[arg(long)]
    atomic_queued: bool,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let data = if args.stacked {
        work::generate_stacked(CHUNK_COUNT, CHUNK_SIZE)
    } else if args.even {
        work::generate_even(CHUNK_COUNT, CHUNK_SIZE)
    } else {
        work::generate_random(CHUNK_COUNT, CHUNK_SIZE)
    };

    let report = if args.queued {
        LockedQueueExecutor::new(WORKER_COUNT).process(&data)
    } else if args.atomic_queued {
        AtomicQueueExecutor::new(WORKER_COUNT).process(&data)
    } else {
        PreassignedExecutor::new(WORKER_COUNT).process(&data)
    };

    println!("Processing took {} seconds", report.elapsed);
    println!("Result is {}", report.result);

    if TIMING_ENABLED {
        timing::write_csv(&report.timings)?;
    }

    Ok(())
}
