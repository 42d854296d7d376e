//! Tests for geo_utils module

use trackdist::GpsPoint;
use trackdist::geo_utils::*;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_geodesic_distance_same_point() {
    let p = GpsPoint::new(51.5074, -0.1278);
    assert_eq!(geodesic_distance_km(&p, &p), 0.0);
}

#[test]
fn test_geodesic_distance_known_value() {
    // London to Paris is approximately 344 km
    let london = GpsPoint::new(51.5074, -0.1278);
    let paris = GpsPoint::new(48.8566, 2.3522);
    let dist = geodesic_distance_km(&london, &paris);
    assert!(approx_eq(dist, 343.9, 2.0));
}

#[test]
fn test_geodesic_distance_symmetric() {
    let a = GpsPoint::new(-33.8688, 151.2093);
    let b = GpsPoint::new(40.7128, -74.0060);
    assert_eq!(geodesic_distance_km(&a, &b), geodesic_distance_km(&b, &a));
}

#[test]
fn test_one_degree_diagonal() {
    let a = GpsPoint::new(5.0, 1.0);
    let b = GpsPoint::new(4.0, 2.0);
    assert!(approx_eq(geodesic_distance_km(&a, &b), 156.66564184752647, 1e-6));
}

#[test]
fn test_validate_point() {
    assert!(validate_point(&GpsPoint::new(51.5, -0.1)).is_ok());
    assert!(validate_point(&GpsPoint::new(90.0, 180.0)).is_ok());
    assert!(validate_point(&GpsPoint::new(91.0, 0.0)).is_err());
    assert!(validate_point(&GpsPoint::new(0.0, -181.0)).is_err());
    assert!(validate_point(&GpsPoint::new(f64::NAN, 0.0)).is_err());
}

#[test]
fn test_path_length() {
    let path = vec![
        GpsPoint::new(5.0, 1.0),
        GpsPoint::new(4.0, 2.0),
        GpsPoint::new(3.0, 3.0),
    ];
    let total = path_length_km(&path);
    assert!(approx_eq(total, 156.66564184752647 + 156.75914242784864, 1e-6));
    assert_eq!(path_length_km(&path[..1]), 0.0);
}
