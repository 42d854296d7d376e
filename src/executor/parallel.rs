//! Partition-parallel executor backed by a per-run rayon pool.

use std::fmt;
use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use super::{
    Execution, ExecutionStats, Executor, RunState, RunTracker, SequentialExecutor,
    compute_partition,
};
use crate::capacity::CapacityDetector;
use crate::distance::DistanceComputer;
use crate::error::{Result, TrackDistError};
use crate::partition::{Partition, merge_partitions, partition_tracks};
use crate::{EngineConfig, TrackCollection};

/// Builds the worker pool for one run, given the planned worker count.
pub type PoolBuilder =
    dyn Fn(usize) -> std::result::Result<ThreadPool, ThreadPoolBuildError> + Send + Sync;

/// Default pool: exactly `workers` named threads.
pub fn build_worker_pool(
    workers: usize,
) -> std::result::Result<ThreadPool, ThreadPoolBuildError> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("trackdist-worker-{}", i))
        .build()
}

/// Fans partitions out to a bounded worker pool and merges them back in
/// partition order.
///
/// The pool is created inside [`execute`](Executor::execute) with exactly
/// [`plan_workers`](Self::plan_workers) threads and dropped before the call
/// returns, on success and failure alike. The global rayon pool is never used.
pub struct ParallelExecutor {
    config: EngineConfig,
    detector: CapacityDetector,
    computer: DistanceComputer,
    pool_builder: Box<PoolBuilder>,
    sequential_fallback: bool,
}

impl fmt::Debug for ParallelExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelExecutor")
            .field("config", &self.config)
            .field("detector", &self.detector)
            .field("computer", &self.computer)
            .field("sequential_fallback", &self.sequential_fallback)
            .finish_non_exhaustive()
    }
}

impl ParallelExecutor {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            detector: CapacityDetector::from_config(&config),
            computer: DistanceComputer::from_config(&config),
            config,
            pool_builder: Box::new(build_worker_pool),
            sequential_fallback: false,
        }
    }

    /// Replace the capacity detector (e.g. a custom probe chain).
    pub fn with_detector(mut self, detector: CapacityDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Replace how the per-run pool is built (thread naming, stack size,
    /// spawn hooks). The builder receives the planned worker count.
    pub fn with_pool_builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(usize) -> std::result::Result<ThreadPool, ThreadPoolBuildError>
            + Send
            + Sync
            + 'static,
    {
        self.pool_builder = Box::new(builder);
        self
    }

    /// Run sequentially instead of failing when the pool cannot be created.
    pub fn with_sequential_fallback(mut self, enabled: bool) -> Self {
        self.sequential_fallback = enabled;
        self
    }

    /// Number of workers to use for `partition_count` partitions.
    ///
    /// `min(detected, partition_count, max_workers)`, never below 1.
    pub fn plan_workers(&self, partition_count: usize) -> usize {
        let mut detected = self.detector.detect();
        // Call-site floor; `CapacityDetector::detect` already never returns 0.
        if detected == 0 {
            detected = self.config.fallback_capacity.max(1);
            info!(
                "[Parallel] Methods to determine the number of CPUs failed. Set number of CPUs to {}",
                detected
            );
        }
        info!(
            "[Parallel] Number of cores currently available for parallel processing: {}",
            detected
        );

        let mut workers = detected.min(partition_count);
        if let Some(max) = self.config.max_workers {
            workers = workers.min(max);
        }
        workers.max(1)
    }
}

impl Executor for ParallelExecutor {
    fn name(&self) -> &'static str {
        "Parallel"
    }

    fn execute(&self, collection: &TrackCollection) -> Result<Execution> {
        let start = Instant::now();
        let mut tracker = RunTracker::new(self.name());

        if !collection.crs.is_geographic() {
            warn!(
                "[Parallel] CRS {} is not geographic; coordinates are read as lon/lat",
                collection.crs
            );
        }
        let computer = self.computer.clone().with_crs(collection.crs.clone());

        let partitions = partition_tracks(collection);
        tracker.advance(RunState::Partitioned);
        let track_ids: Vec<&str> = partitions.iter().map(|p| p.track_id.as_str()).collect();
        info!("[Parallel] Track IDs discovered: {:?}", track_ids);

        let partition_count = partitions.len();
        if partition_count == 0 {
            tracker.advance(RunState::Merged);
            return Ok(Execution {
                collection: collection.with_fixes(Vec::new()),
                stats: ExecutionStats {
                    partitions: 0,
                    workers: 0,
                    elapsed: start.elapsed(),
                    state: tracker.state(),
                },
            });
        }

        let workers = self.plan_workers(partition_count);
        info!(
            "[Parallel] Number of cores that will be used for parallel processing: {}",
            workers
        );

        let pool = match (self.pool_builder)(workers) {
            Ok(pool) => pool,
            Err(source) if self.sequential_fallback => {
                // The sequential run owns the request from here on.
                warn!(
                    "[Parallel] Could not create pool of {} workers ({}), running sequentially",
                    workers, source
                );
                return SequentialExecutor::with_computer(computer).execute(collection);
            }
            Err(source) => {
                tracker.advance(RunState::Failed);
                warn!("[Parallel] Could not create pool of {} workers: {}", workers, source);
                return Err(TrackDistError::PoolCreation { workers, source });
            }
        };
        tracker.advance(RunState::Dispatched);
        tracker.advance(RunState::Awaiting);

        // One partition per job so per-partition delays overlap across workers.
        let results: Result<Vec<Partition>> = pool.install(|| {
            partitions
                .into_par_iter()
                .with_max_len(1)
                .map(|p| compute_partition(&computer, p))
                .collect()
        });
        drop(pool);

        let done = match results {
            Ok(done) => done,
            Err(e) => {
                tracker.advance(RunState::Failed);
                warn!("[Parallel] Run failed: {}", e);
                return Err(e);
            }
        };

        let fixes = merge_partitions(done);
        tracker.advance(RunState::Merged);

        let elapsed = start.elapsed();
        info!(
            "[Parallel] Processed {} fixes in {} tracks with {} workers in {:?}",
            fixes.len(),
            partition_count,
            workers,
            elapsed
        );

        Ok(Execution {
            collection: collection.with_fixes(fixes),
            stats: ExecutionStats {
                partitions: partition_count,
                workers,
                elapsed,
                state: tracker.state(),
            },
        })
    }
}
