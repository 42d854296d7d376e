//! Synthetic track generator for stress testing and benchmarking.
//!
//! Generates deterministic random-walk tracks with ascending timestamps,
//! optionally interleaved the way fixes from several tags arrive in a
//! combined feed.
//!
//! Feature-gated behind `synthetic` — not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use trackdist::synthetic::SyntheticScenario;
//!
//! let scenario = SyntheticScenario {
//!     track_count: 4,
//!     fixes_per_track: 50,
//!     ..SyntheticScenario::default()
//! };
//!
//! let dataset = scenario.generate();
//! assert_eq!(dataset.collection.len(), 200);
//! assert_eq!(dataset.collection.track_ids().len(), 4);
//! ```

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use crate::geo_utils::path_length_km;
use crate::{Fix, GpsPoint, TrackCollection};

// ============================================================================
// Types
// ============================================================================

/// Scenario configuration for generating synthetic tracks.
#[derive(Debug, Clone)]
pub struct SyntheticScenario {
    /// Origin point around which tracks start.
    pub origin: GpsPoint,
    /// Number of tracks to generate.
    pub track_count: usize,
    /// Fixes per track.
    pub fixes_per_track: usize,
    /// Mean step between fixes in meters.
    pub step_meters: f64,
    /// Seconds between consecutive fixes of one track.
    pub interval_secs: i64,
    /// Emit fixes round-robin across tracks instead of track by track.
    pub interleave: bool,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl Default for SyntheticScenario {
    fn default() -> Self {
        Self {
            origin: GpsPoint::new(47.37, 8.55),
            track_count: 8,
            fixes_per_track: 500,
            step_meters: 250.0,
            interval_secs: 600,
            interleave: false,
            seed: 42,
        }
    }
}

/// Metadata about a generated dataset.
#[derive(Debug, Clone)]
pub struct DatasetMetadata {
    /// Total fixes across all tracks.
    pub total_fixes: usize,
    /// Geodesic length of each track in kilometers, in track order.
    pub track_lengths_km: Vec<f64>,
}

/// A generated collection with its metadata.
pub struct SyntheticDataset {
    pub collection: TrackCollection,
    pub metadata: DatasetMetadata,
}

// ============================================================================
// Coordinate Helpers
// ============================================================================

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEG_LAT: f64 = 111_320.0;

fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

fn meters_to_deg_lng(meters: f64, latitude: f64) -> f64 {
    let meters_per_deg_lng = METERS_PER_DEG_LAT * latitude.to_radians().cos();
    if meters_per_deg_lng.abs() < 1e-10 {
        return 0.0;
    }
    meters / meters_per_deg_lng
}

/// Random walk with bounded heading changes.
fn generate_walk(start: GpsPoint, count: usize, step: f64, rng: &mut StdRng) -> Vec<GpsPoint> {
    let mut points = Vec::with_capacity(count);
    if count == 0 {
        return points;
    }

    let mut heading: f64 = rng.gen_range(0.0..2.0 * PI);
    let mut current = start;
    points.push(current);

    for _ in 1..count {
        heading += rng.gen_range(-0.4..0.4);
        let dist = step * rng.gen_range(0.5..1.5);

        let lat = (current.latitude + meters_to_deg_lat(dist * heading.sin())).clamp(-89.9, 89.9);
        let mut lng = current.longitude + meters_to_deg_lng(dist * heading.cos(), current.latitude);
        if lng > 180.0 {
            lng -= 360.0;
        } else if lng < -180.0 {
            lng += 360.0;
        }

        current = GpsPoint::new(lat, lng);
        points.push(current);
    }

    points
}

// ============================================================================
// Scenario Implementation
// ============================================================================

impl SyntheticScenario {
    /// Generate a collection from this scenario.
    pub fn generate(&self) -> SyntheticDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let epoch: NaiveDateTime = NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();

        let tracks: Vec<(String, Vec<GpsPoint>)> = (0..self.track_count)
            .map(|i| {
                let start = GpsPoint::new(
                    self.origin.latitude + meters_to_deg_lat(rng.gen_range(-5_000.0..5_000.0)),
                    self.origin.longitude
                        + meters_to_deg_lng(rng.gen_range(-5_000.0..5_000.0), self.origin.latitude),
                );
                let points = generate_walk(start, self.fixes_per_track, self.step_meters, &mut rng);
                (format!("track-{:03}", i), points)
            })
            .collect();

        let track_lengths_km = tracks.iter().map(|(_, p)| path_length_km(p)).collect();

        let to_fix = |id: &str, idx: usize, p: &GpsPoint| {
            let t = epoch + ChronoDuration::seconds(self.interval_secs * idx as i64);
            Fix::new(t, p.latitude, p.longitude, id)
        };

        let mut fixes = Vec::with_capacity(self.track_count * self.fixes_per_track);
        if self.interleave {
            for idx in 0..self.fixes_per_track {
                for (id, points) in &tracks {
                    fixes.push(to_fix(id.as_str(), idx, &points[idx]));
                }
            }
        } else {
            for (id, points) in &tracks {
                for (idx, p) in points.iter().enumerate() {
                    fixes.push(to_fix(id.as_str(), idx, p));
                }
            }
        }

        SyntheticDataset {
            metadata: DatasetMetadata {
                total_fixes: fixes.len(),
                track_lengths_km,
            },
            collection: TrackCollection::new(fixes, "track_id"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition_tracks;

    #[test]
    fn test_deterministic() {
        let scenario = SyntheticScenario {
            track_count: 3,
            fixes_per_track: 20,
            ..Default::default()
        };
        let a = scenario.generate();
        let b = scenario.generate();
        assert_eq!(a.collection, b.collection);
    }

    #[test]
    fn test_interleaved_partitions_match_tracks() {
        let scenario = SyntheticScenario {
            track_count: 3,
            fixes_per_track: 10,
            interleave: true,
            ..Default::default()
        };
        let dataset = scenario.generate();
        assert_eq!(dataset.collection.fixes[0].track_id, "track-000");
        assert_eq!(dataset.collection.fixes[1].track_id, "track-001");

        let partitions = partition_tracks(&dataset.collection);
        assert_eq!(partitions.len(), 3);
        assert!(partitions.iter().all(|p| p.len() == 10));
        assert!(partitions.iter().all(|p| p.fixes.iter().all(|f| f.position.is_valid())));
    }
}
