use crate::errors::{
    ConfigError,
    NovoScoreError,
};
use rayon::{
    ThreadPool,
    ThreadPoolBuilder,
};
use std::ops::Range;

/// Splits `0..len` into `workers` contiguous ranges.
///
/// Every range but the last has `len / workers` elements; the last one takes
/// the remainder. With fewer rows than workers the leading ranges are empty.
pub fn chunk_ranges(len: usize, workers: usize) -> Result<Vec<Range<usize>>, ConfigError> {
    if workers == 0 {
        return Err(ConfigError::ZeroWorkers);
    }
    let chunk_size = len / workers;
    Ok((0..workers)
        .map(|i| {
            let start = i * chunk_size;
            let end = if i + 1 < workers {
                (i + 1) * chunk_size
            } else {
                len
            };
            start..end
        })
        .collect())
}

/// A pool with exactly `workers` threads, owned by a single run.
pub fn worker_pool(workers: usize) -> Result<ThreadPool, NovoScoreError> {
    if workers == 0 {
        return Err(ConfigError::ZeroWorkers.into());
    }
    Ok(ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("novoscore-worker-{}", i))
        .build()?)
}
