//! Tests for lib.rs core types

use trackdist::{Crs, EngineConfig, Fix, GpsPoint, TrackCollection};

#[test]
fn test_gps_point_validation() {
    assert!(GpsPoint::new(51.5074, -0.1278).is_valid());
    assert!(!GpsPoint::new(91.0, 0.0).is_valid());
    assert!(!GpsPoint::new(0.0, 181.0).is_valid());
    assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
}

#[test]
fn test_point_xy_extraction() {
    let p: geo::Point<f64> = GpsPoint::new(5.0, 1.0).into();
    assert_eq!(p.x(), 1.0);
    assert_eq!(p.y(), 5.0);
    assert_eq!(GpsPoint::from(p), GpsPoint::new(5.0, 1.0));
}

#[test]
fn test_fix_starts_without_distance() {
    let fix = Fix::new(chrono::NaiveDateTime::default(), 5.0, 1.0, "ID_1");
    assert_eq!(fix.distance_from_previous, None);
    assert_eq!(fix.x(), 1.0);
    assert_eq!(fix.y(), 5.0);
}

#[test]
fn test_track_ids_first_seen() {
    let t = chrono::NaiveDateTime::default();
    let collection = TrackCollection::new(
        vec![
            Fix::new(t, 0.0, 0.0, "b"),
            Fix::new(t, 0.0, 0.0, "a"),
            Fix::new(t, 0.0, 0.0, "b"),
        ],
        "individual",
    );
    assert_eq!(collection.track_ids(), vec!["b", "a"]);
    assert_eq!(collection.len(), 3);
}

#[test]
fn test_crs_geographic() {
    assert!(Crs::wgs84().is_geographic());
    assert!(Crs("epsg:4326".to_string()).is_geographic());
    assert!(Crs("WGS84".to_string()).is_geographic());
    assert!(!Crs("EPSG:3857".to_string()).is_geographic());
    assert_eq!(Crs::default(), Crs::wgs84());
}

#[test]
fn test_engine_config_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.partition_delay_ms, 0);
    assert_eq!(config.fallback_capacity, 3);
    assert_eq!(config.max_workers, None);
    assert_eq!(config.cgroup_root, std::path::PathBuf::from("/sys/fs/cgroup"));

    let bench = EngineConfig::for_benchmark();
    assert_eq!(bench.partition_delay_ms, 10_000);
    assert_eq!(bench.partition_delay(), std::time::Duration::from_secs(10));
}
