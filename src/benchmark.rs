//! Sequential vs parallel timing comparison.

use std::time::Duration;

use log::{info, warn};

use crate::error::Result;
use crate::executor::{Executor, ParallelExecutor, SequentialExecutor};
use crate::{EngineConfig, TrackCollection};

/// Timings and agreement of one sequential and one parallel run.
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub sequential_elapsed: Duration,
    pub parallel_elapsed: Duration,
    /// Workers used by the parallel run
    pub workers: usize,
    pub partitions: usize,
    /// Whether both runs produced row-for-row identical output
    pub outputs_match: bool,
    /// Output of the parallel run
    pub result: TrackCollection,
}

impl BenchmarkReport {
    /// Sequential time divided by parallel time.
    pub fn speedup(&self) -> f64 {
        let par = self.parallel_elapsed.as_secs_f64();
        if par <= 0.0 {
            return 1.0;
        }
        self.sequential_elapsed.as_secs_f64() / par
    }
}

/// Run both executors on the same input and compare them.
///
/// Fails if either run fails. A mismatch between the two outputs is reported
/// through [`BenchmarkReport::outputs_match`], not as an error.
pub fn compare_executors(
    collection: &TrackCollection,
    config: &EngineConfig,
) -> Result<BenchmarkReport> {
    compare_with(
        collection,
        &SequentialExecutor::new(config),
        &ParallelExecutor::new(config.clone()),
    )
}

/// Same as [`compare_executors`] with caller-built executors.
pub fn compare_with(
    collection: &TrackCollection,
    sequential: &SequentialExecutor,
    parallel: &ParallelExecutor,
) -> Result<BenchmarkReport> {
    info!("[Benchmark] Calculating distances using sequential computing");
    let seq = sequential.execute(collection)?;
    info!(
        "[Benchmark] Time used for calculating distances using sequential computing: {:?}",
        seq.stats.elapsed
    );

    info!("[Benchmark] Calculating distances using parallel computing");
    let par = parallel.execute(collection)?;
    info!(
        "[Benchmark] Time used for calculating distances using parallel computing: {:?}",
        par.stats.elapsed
    );

    let outputs_match = seq.collection == par.collection;
    if !outputs_match {
        warn!("[Benchmark] Sequential and parallel outputs differ");
    }

    Ok(BenchmarkReport {
        sequential_elapsed: seq.stats.elapsed,
        parallel_elapsed: par.stats.elapsed,
        workers: par.stats.workers,
        partitions: par.stats.partitions,
        outputs_match,
        result: par.collection,
    })
}
