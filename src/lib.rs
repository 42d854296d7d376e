//! # Track Distances
//!
//! Partition-parallel geodesic distance computation for GPS track collections.
//!
//! This library provides:
//! - Container-aware worker capacity detection (cgroup quota, logical cores, fixed fallback)
//! - Track-keyed partitioning that preserves first-encountered track order
//! - Successive-fix geodesic distances per track, in kilometers
//! - A bounded, per-run worker pool executor and a sequential reference executor
//! - Sequential vs parallel timing comparison
//!
//! ## Features
//!
//! - **`cli`** - Build the `trackdist-cli` host binary (CSV in/out, JSON config)
//! - **`synthetic`** - Deterministic synthetic track generator for benches
//!
//! ## Quick Start
//!
//! ```rust
//! use trackdist::{EngineConfig, Executor, Fix, ParallelExecutor, TrackCollection};
//!
//! let t0 = chrono::NaiveDate::from_ymd_opt(2001, 6, 11)
//!     .unwrap()
//!     .and_hms_opt(9, 0, 0)
//!     .unwrap();
//!
//! let collection = TrackCollection::new(
//!     vec![
//!         Fix::new(t0, 5.0, 1.0, "ID_1"),
//!         Fix::new(t0, 4.0, 2.0, "ID_1"),
//!     ],
//!     "track_id",
//! );
//!
//! let executor = ParallelExecutor::new(EngineConfig::default());
//! let result = executor.run(&collection).unwrap();
//!
//! assert_eq!(result.fixes[0].distance_from_previous, None);
//! assert!(result.fixes[1].distance_from_previous.unwrap() > 156.0);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TrackDistError};

// Geodesic primitive and coordinate validation
pub mod geo_utils;

// Worker capacity detection (cgroup quota -> logical cores -> fixed default)
pub mod capacity;
pub use capacity::{
    CapacityDetector, CapacityProbe, CgroupV1Probe, CgroupV2Probe, DEFAULT_CAPACITY,
    LogicalCoresProbe,
};

// Track-keyed partitioning
pub mod partition;
pub use partition::{Partition, partition_tracks};

// Per-partition successive distance computation
pub mod distance;
pub use distance::DistanceComputer;

// Parallel and sequential executors
pub mod executor;
pub use executor::{
    Execution, ExecutionStats, Executor, ParallelExecutor, PoolBuilder, RunState,
    SequentialExecutor, build_worker_pool,
};

// Sequential vs parallel timing comparison
pub mod benchmark;
pub use benchmark::{BenchmarkReport, compare_executors};

// Synthetic track generator for benches and stress tests
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use trackdist::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

impl From<GpsPoint> for geo::Point<f64> {
    fn from(p: GpsPoint) -> Self {
        geo::Point::new(p.longitude, p.latitude)
    }
}

impl From<geo::Point<f64>> for GpsPoint {
    fn from(p: geo::Point<f64>) -> Self {
        GpsPoint::new(p.y(), p.x())
    }
}

/// A single timestamped observation belonging to one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Observation time (ordered within a track, not necessarily unique)
    pub timestamp: NaiveDateTime,
    /// Geographic position
    pub position: GpsPoint,
    /// Identifier of the track this fix belongs to
    pub track_id: String,
    /// Geodesic distance to the previous fix of the same track, in kilometers.
    /// `None` for the first fix of a track or before computation.
    #[serde(default)]
    pub distance_from_previous: Option<f64>,
}

impl Fix {
    /// Create a fix with no distance assigned yet.
    pub fn new(
        timestamp: NaiveDateTime,
        latitude: f64,
        longitude: f64,
        track_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            position: GpsPoint::new(latitude, longitude),
            track_id: track_id.into(),
            distance_from_previous: None,
        }
    }

    /// Longitude.
    pub fn x(&self) -> f64 {
        self.position.longitude
    }

    /// Latitude.
    pub fn y(&self) -> f64 {
        self.position.latitude
    }
}

/// Spatial reference system identifier, e.g. `"EPSG:4326"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(pub String);

impl Crs {
    /// Geographic WGS84 longitude/latitude.
    pub fn wgs84() -> Self {
        Crs("EPSG:4326".to_string())
    }

    /// Whether coordinates in this system are already geographic lon/lat.
    pub fn is_geographic(&self) -> bool {
        let code = self.0.trim().to_ascii_lowercase();
        matches!(
            code.as_str(),
            "epsg:4326" | "4326" | "wgs84" | "wgs 84" | "ogc:crs84" | "urn:ogc:def:crs:epsg::4326"
        )
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered collection of fixes from one or more tracks.
///
/// Within a track, fixes are expected in ascending timestamp order. The
/// collection is never re-sorted; input order is trusted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackCollection {
    pub fixes: Vec<Fix>,
    /// Name of the column holding the track identifier (passed through)
    pub track_id_column: String,
    /// Spatial reference system (passed through)
    #[serde(default)]
    pub crs: Crs,
}

impl TrackCollection {
    /// Create a collection in WGS84.
    pub fn new(fixes: Vec<Fix>, track_id_column: impl Into<String>) -> Self {
        Self {
            fixes,
            track_id_column: track_id_column.into(),
            crs: Crs::wgs84(),
        }
    }

    /// Replace the spatial reference system.
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = crs;
        self
    }

    /// Number of fixes.
    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// Distinct track identifiers in first-encountered order.
    pub fn track_ids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.fixes
            .iter()
            .map(|f| f.track_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Same column name and CRS, different fixes.
    pub(crate) fn with_fixes(&self, fixes: Vec<Fix>) -> Self {
        Self {
            fixes,
            track_id_column: self.track_id_column.clone(),
            crs: self.crs.clone(),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Artificial delay incurred once per partition, in milliseconds.
    /// Simulates an expensive remote lookup so parallel vs sequential timing
    /// differences become observable.
    /// Default: 0
    pub partition_delay_ms: u64,

    /// Worker count used when every capacity probe fails.
    /// Default: 3
    pub fallback_capacity: usize,

    /// Optional upper bound on workers, applied after detection.
    /// Default: None
    pub max_workers: Option<usize>,

    /// Root of the cgroup filesystem probed for CPU quotas.
    /// Default: /sys/fs/cgroup
    pub cgroup_root: PathBuf,
}

impl EngineConfig {
    /// Delay of the 10 second timing-comparison setup.
    pub const BENCHMARK_DELAY_MS: u64 = 10_000;

    /// Preset for sequential vs parallel timing comparisons.
    pub fn for_benchmark() -> Self {
        Self {
            partition_delay_ms: Self::BENCHMARK_DELAY_MS,
            ..Self::default()
        }
    }

    /// Per-partition delay as a `Duration`.
    pub fn partition_delay(&self) -> Duration {
        Duration::from_millis(self.partition_delay_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            partition_delay_ms: 0,
            fallback_capacity: DEFAULT_CAPACITY,
            max_workers: None,
            cgroup_root: PathBuf::from(capacity::CGROUP_ROOT),
        }
    }
}
