//! Per-chunk timing records and their CSV rendition.

use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Captured once per chunk: how long each worker spent working, how many
/// heavy items it drew, and the wall-clock time of the whole chunk.
///
/// Holds `0 <= work_time[i] <= total_chunk_time`; idle time is derived at
/// emission time as `total_chunk_time - work_time[i]`.
pub struct ChunkTiming {
    pub work_time: Vec<f32>,
    pub heavy_count: Vec<usize>,
    pub total_chunk_time: f32,
}

/// The outcome of driving one executor over a dataset.
pub struct Report {
    /// Sum of the per-worker accumulators (wrapping).
    pub result: u32,
    /// Total wall-clock seconds for the dataset.
    pub elapsed: f32,
    pub timings: Vec<ChunkTiming>,
}

/// Writes `timings.csv` in the working directory, truncating any previous
/// run's output.
pub fn write_csv(timings: &[ChunkTiming]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create("timings.csv")?);
    emit_csv(timings, &mut out)
}

pub fn emit_csv<W: Write>(timings: &[ChunkTiming], out: &mut W) -> io::Result<()> {
    let workers = timings.first().map_or(0, |chunk| chunk.work_time.len());

    for i in 0..workers {
        write!(out, "work_{0}, idle_{0}, heavy_{0}, ", i)?;
    }
    writeln!(out, "chunk_time, total_idle, total_heavy")?;

    for chunk in timings {
        let mut total_idle = 0.0f32;
        let mut total_heavy = 0usize;
        for i in 0..workers {
            let idle = chunk.total_chunk_time - chunk.work_time[i];
            let heavy = chunk.heavy_count[i];
            write!(out, "{},{},{},", chunk.work_time[i], idle, heavy)?;
            total_idle += idle;
            total_heavy += heavy;
        }
        writeln!(out, "{},{},{}", chunk.total_chunk_time, total_idle, total_heavy)?;
    }

    Ok(())
}
