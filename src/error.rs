//! Unified error type for the crate.
//!
//! Capacity errors are recoverable and never leave the `capacity` module.
//! Computation, pool and worker errors abort the whole run.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TrackDistError>;

#[derive(Debug, Error)]
pub enum TrackDistError {
    /// A capacity probe could not produce a usable worker count.
    #[error("capacity probe '{probe}' failed: {reason}")]
    CapacityDetection { probe: String, reason: String },

    /// Distance computation failed inside one partition.
    #[error("distance computation failed for track '{track_id}' at fix {index}: {reason}")]
    Computation {
        track_id: String,
        index: usize,
        reason: String,
    },

    /// The worker pool could not be created.
    #[error("failed to create worker pool with {workers} workers: {source}")]
    PoolCreation {
        workers: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    /// A worker panicked while processing a partition.
    #[error("worker panicked while processing track '{track_id}'")]
    WorkerPanicked { track_id: String },
}

impl TrackDistError {
    pub(crate) fn capacity(probe: &str, reason: impl Into<String>) -> Self {
        TrackDistError::CapacityDetection {
            probe: probe.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn computation(track_id: &str, index: usize, reason: impl Into<String>) -> Self {
        TrackDistError::Computation {
            track_id: track_id.to_string(),
            index,
            reason: reason.into(),
        }
    }

    /// Track identifier of the partition that failed, if any.
    pub fn track_id(&self) -> Option<&str> {
        match self {
            TrackDistError::Computation { track_id, .. }
            | TrackDistError::WorkerPanicked { track_id } => Some(track_id),
            _ => None,
        }
    }

    /// Whether the engine recovers from this error on its own.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TrackDistError::CapacityDetection { .. })
    }
}
