//! Geographic utilities: the geodesic distance primitive and coordinate checks.

use geo::{Distance, Geodesic, Point};

use crate::GpsPoint;

/// Meters per kilometer.
const METERS_PER_KM: f64 = 1000.0;

/// Geodesic distance between two points on the WGS84 ellipsoid, in kilometers.
///
/// Uses Karney's algorithm via `geo::Geodesic`. Deterministic and symmetric:
/// `geodesic_distance_km(a, b) == geodesic_distance_km(b, a)`.
///
/// # Example
/// ```
/// use trackdist::GpsPoint;
/// use trackdist::geo_utils::geodesic_distance_km;
///
/// let a = GpsPoint::new(5.0, 1.0);
/// let b = GpsPoint::new(4.0, 2.0);
/// let d = geodesic_distance_km(&a, &b);
/// assert!((d - 156.6656).abs() < 0.001);
/// ```
pub fn geodesic_distance_km(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let a: Point<f64> = (*p1).into();
    let b: Point<f64> = (*p2).into();
    Geodesic.distance(a, b) / METERS_PER_KM
}

/// Check that a point can be fed to the geodesic primitive.
///
/// Returns a human-readable reason when the point is non-finite or out of range.
pub fn validate_point(p: &GpsPoint) -> Result<(), String> {
    if !p.latitude.is_finite() || !p.longitude.is_finite() {
        return Err(format!(
            "non-finite coordinate (lat={}, lng={})",
            p.latitude, p.longitude
        ));
    }
    if !(-90.0..=90.0).contains(&p.latitude) {
        return Err(format!("latitude {} out of range [-90, 90]", p.latitude));
    }
    if !(-180.0..=180.0).contains(&p.longitude) {
        return Err(format!("longitude {} out of range [-180, 180]", p.longitude));
    }
    Ok(())
}

/// Total geodesic length of a point sequence, in kilometers.
pub fn path_length_km(points: &[GpsPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| geodesic_distance_km(&w[0], &w[1]))
        .sum()
}
