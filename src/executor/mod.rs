//! # Executors
//!
//! Two interchangeable ways of applying [`DistanceComputer`](crate::DistanceComputer)
//! to every partition of a collection:
//! - `ParallelExecutor` - owns a bounded worker pool built per run
//! - `SequentialExecutor` - reference loop on the calling thread
//!
//! Both merge results in partition order (first-encountered track order), so
//! their outputs are row-for-row identical for the same input.

pub mod parallel;
pub mod sequential;

pub use parallel::{ParallelExecutor, PoolBuilder, build_worker_pool};
pub use sequential::SequentialExecutor;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use log::debug;

use crate::TrackCollection;
use crate::distance::DistanceComputer;
use crate::error::{Result, TrackDistError};
use crate::partition::Partition;

/// Lifecycle of one execution request.
///
/// `Received -> Partitioned -> Dispatched -> Awaiting -> Merged | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Received,
    Partitioned,
    Dispatched,
    Awaiting,
    /// Terminal success state
    Merged,
    /// Terminal failure state
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Received => "received",
            RunState::Partitioned => "partitioned",
            RunState::Dispatched => "dispatched",
            RunState::Awaiting => "awaiting",
            RunState::Merged => "merged",
            RunState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Merged | RunState::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Received, Partitioned)
                | (Partitioned, Dispatched)
                | (Partitioned, Merged)
                | (Partitioned, Failed)
                | (Dispatched, Awaiting)
                | (Dispatched, Failed)
                | (Awaiting, Merged)
                | (Awaiting, Failed)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks and logs state transitions for one run.
#[derive(Debug)]
pub(crate) struct RunTracker {
    executor: &'static str,
    state: RunState,
}

impl RunTracker {
    pub(crate) fn new(executor: &'static str) -> Self {
        debug!("[{}] state: {}", executor, RunState::Received);
        Self {
            executor,
            state: RunState::Received,
        }
    }

    pub(crate) fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!("[{}] state: {} -> {}", self.executor, self.state, next);
        self.state = next;
    }

    pub(crate) fn state(&self) -> RunState {
        self.state
    }
}

/// Counters for one completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionStats {
    /// Number of partitions (distinct tracks)
    pub partitions: usize,
    /// Workers used; the sequential path reports 1, an empty input reports 0
    pub workers: usize,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
    /// Terminal state of the run
    pub state: RunState,
}

/// The augmented collection plus run statistics.
#[derive(Debug, Clone)]
pub struct Execution {
    pub collection: TrackCollection,
    pub stats: ExecutionStats,
}

/// Applies the distance computation to every partition of a collection.
///
/// Output is either complete or absent: any partition failure fails the run.
pub trait Executor {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Run and return the augmented collection with statistics.
    fn execute(&self, collection: &TrackCollection) -> Result<Execution>;

    /// Run and return only the augmented collection.
    fn run(&self, collection: &TrackCollection) -> Result<TrackCollection> {
        self.execute(collection).map(|e| e.collection)
    }
}

/// Run one partition, turning a panic into [`TrackDistError::WorkerPanicked`].
pub(crate) fn compute_partition(
    computer: &DistanceComputer,
    partition: Partition,
) -> Result<Partition> {
    catch_partition_panic(partition, |p| computer.compute(p))
}

fn catch_partition_panic<F>(partition: Partition, compute: F) -> Result<Partition>
where
    F: FnOnce(Partition) -> Result<Partition>,
{
    let track_id = partition.track_id.clone();
    panic::catch_unwind(AssertUnwindSafe(|| compute(partition)))
        .unwrap_or_else(|_| Err(TrackDistError::WorkerPanicked { track_id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panicking_partition_becomes_error() {
        let partition = Partition::new("ID_7", Vec::new());
        let err = catch_partition_panic(partition, |_| panic!("lookup service went away"))
            .unwrap_err();
        assert!(matches!(
            err,
            TrackDistError::WorkerPanicked { ref track_id } if track_id == "ID_7"
        ));
    }

    #[test]
    fn test_ok_partition_passes_through() {
        let partition = Partition::new("ID_1", Vec::new());
        let done = compute_partition(&DistanceComputer::default(), partition).unwrap();
        assert_eq!(done.track_id, "ID_1");
        assert!(done.is_empty());
    }
}
