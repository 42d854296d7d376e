//! Tests for error module

use trackdist::error::TrackDistError;

#[test]
fn test_computation_error_display() {
    let err = TrackDistError::Computation {
        track_id: "ID_7".to_string(),
        index: 3,
        reason: "latitude 91 out of range [-90, 90]".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("ID_7"));
    assert!(msg.contains("fix 3"));
    assert!(msg.contains("latitude 91"));
    assert_eq!(err.track_id(), Some("ID_7"));
    assert!(!err.is_recoverable());
}

#[test]
fn test_capacity_error_is_recoverable() {
    let err = TrackDistError::CapacityDetection {
        probe: "cgroup-v1".to_string(),
        reason: "No such file or directory".to_string(),
    };
    assert!(err.is_recoverable());
    assert!(err.to_string().contains("cgroup-v1"));
    assert_eq!(err.track_id(), None);
}

#[test]
fn test_worker_panic_names_track() {
    let err = TrackDistError::WorkerPanicked {
        track_id: "ID_2".to_string(),
    };
    assert_eq!(err.track_id(), Some("ID_2"));
    assert!(err.to_string().contains("ID_2"));
}
