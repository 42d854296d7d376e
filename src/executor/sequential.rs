//! Sequential reference executor.

use std::time::Instant;

use log::info;

use super::{Execution, ExecutionStats, Executor, RunState, RunTracker, compute_partition};
use crate::distance::DistanceComputer;
use crate::error::Result;
use crate::partition::{merge_partitions, partition_tracks};
use crate::{EngineConfig, TrackCollection};

/// Applies the distance computation partition by partition on the calling
/// thread. No pool, no capacity detection.
#[derive(Debug, Clone, Default)]
pub struct SequentialExecutor {
    computer: DistanceComputer,
}

impl SequentialExecutor {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_computer(DistanceComputer::from_config(config))
    }

    pub fn with_computer(computer: DistanceComputer) -> Self {
        Self { computer }
    }
}

impl Executor for SequentialExecutor {
    fn name(&self) -> &'static str {
        "Sequential"
    }

    fn execute(&self, collection: &TrackCollection) -> Result<Execution> {
        let start = Instant::now();
        let mut tracker = RunTracker::new(self.name());
        let computer = self.computer.clone().with_crs(collection.crs.clone());

        let partitions = partition_tracks(collection);
        tracker.advance(RunState::Partitioned);

        let partition_count = partitions.len();
        let workers = usize::from(partition_count > 0);
        if partition_count > 0 {
            tracker.advance(RunState::Dispatched);
            tracker.advance(RunState::Awaiting);
        }

        let mut done = Vec::with_capacity(partition_count);
        for partition in partitions {
            match compute_partition(&computer, partition) {
                Ok(p) => done.push(p),
                Err(e) => {
                    tracker.advance(RunState::Failed);
                    return Err(e);
                }
            }
        }

        let fixes = merge_partitions(done);
        tracker.advance(RunState::Merged);

        let elapsed = start.elapsed();
        info!(
            "[Sequential] Processed {} fixes in {} tracks in {:?}",
            fixes.len(),
            partition_count,
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
