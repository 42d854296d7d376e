//! Successive-fix geodesic distances within one partition.

use std::thread;
use std::time::Duration;

use log::debug;

use crate::error::{Result, TrackDistError};
use crate::geo_utils::{geodesic_distance_km, validate_point};
use crate::partition::Partition;
use crate::{Crs, EngineConfig};

/// Computes `distance_from_previous` for every fix of a partition.
///
/// Holds no shared mutable state: each call consumes its own partition and
/// returns it augmented, so it can run on any worker.
#[derive(Debug, Clone)]
pub struct DistanceComputer {
    delay: Duration,
    crs: Crs,
}

impl Default for DistanceComputer {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl DistanceComputer {
    /// Computer with a fixed per-partition delay, reading coordinates as WGS84.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            crs: Crs::wgs84(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.partition_delay())
    }

    /// Declare the CRS of incoming coordinates.
    ///
    /// Coordinates are always interpreted as lon/lat; a non-geographic CRS is
    /// only noted in the logs, never reprojected.
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = crs;
        self
    }

    /// Per-partition delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Augment a partition with successive distances in kilometers.
    ///
    /// The first fix gets `None`; every later fix gets the geodesic distance to
    /// its predecessor. Fails on the first non-finite or out-of-range
    /// coordinate without touching the remaining fixes.
    pub fn compute(&self, mut partition: Partition) -> Result<Partition> {
        debug!(
            "[Distance] Calculating distances for track '{}' ({} fixes)",
            partition.track_id,
            partition.len()
        );
        if !self.crs.is_geographic() {
            debug!(
                "[Distance] Reading {} coordinates as lon/lat for track '{}'",
                self.crs, partition.track_id
            );
        }

        for (idx, fix) in partition.fixes.iter().enumerate() {
            validate_point(&fix.position)
                .map_err(|reason| TrackDistError::computation(&partition.track_id, idx, reason))?;
        }

        let mut distances: Vec<Option<f64>> = Vec::with_capacity(partition.len());
        if !partition.is_empty() {
            distances.push(None);
        }
        for (idx, pair) in partition.fixes.windows(2).enumerate() {
            let d = geodesic_distance_km(&pair[0].position, &pair[1].position);
            if !d.is_finite() {
                return Err(TrackDistError::computation(
                    &partition.track_id,
                    idx + 1,
                    format!("geodesic distance is not finite ({})", d),
                ));
            }
            distances.push(Some(d));
        }

        for (fix, d) in partition.fixes.iter_mut().zip(distances) {
            fix.distance_from_previous = d;
        }

        if !self.delay.is_zero() {
            debug!(
                "[Distance] Sleeping for {:?} on track '{}'",
                self.delay, partition.track_id
            );
            thread::sleep(self.delay);
        }

        Ok(partition)
    }
}
