//! Tests for benchmark module

use std::time::Duration;

use chrono::NaiveDateTime;
use trackdist::benchmark::compare_with;
use trackdist::capacity::{CapacityDetector, CapacityProbe};
use trackdist::error::Result;
use trackdist::{
    EngineConfig, Fix, ParallelExecutor, SequentialExecutor, TrackCollection, compare_executors,
};

struct FixedProbe(usize);

impl CapacityProbe for FixedProbe {
    fn name(&self) -> &str {
        "fixed"
    }

    fn probe(&self) -> Result<usize> {
        Ok(self.0)
    }
}

fn collection(tracks: usize) -> TrackCollection {
    let t = NaiveDateTime::default();
    let fixes = (0..tracks)
        .flat_map(|i| {
            (0..4).map(move |j| {
                Fix::new(t, 40.0 + j as f64 * 0.01, 10.0 + i as f64, format!("T{}", i))
            })
        })
        .collect();
    TrackCollection::new(fixes, "track_id")
}

#[test]
fn test_compare_outputs_match() {
    let report = compare_executors(&collection(3), &EngineConfig::default()).unwrap();
    assert!(report.outputs_match);
    assert_eq!(report.partitions, 3);
    assert!(report.workers >= 1 && report.workers <= 3);
    assert_eq!(report.result.len(), 12);
}

#[test]
fn test_compare_reports_speedup_with_delay() {
    let config = EngineConfig {
        partition_delay_ms: 150,
        ..EngineConfig::default()
    };
    let parallel = ParallelExecutor::new(config.clone())
        .with_detector(CapacityDetector::with_probes(vec![Box::new(FixedProbe(3))], 3));
    let report = compare_with(
        &collection(3),
        &SequentialExecutor::new(&config),
        &parallel,
    )
    .unwrap();

    assert!(report.outputs_match);
    assert_eq!(report.workers, 3);
    assert!(report.sequential_elapsed >= Duration::from_millis(450));
    assert!(report.speedup() > 1.5);
}

#[test]
fn test_compare_empty() {
    let empty = TrackCollection::new(vec![], "track_id");
    let report = compare_executors(&empty, &EngineConfig::default()).unwrap();
    assert!(report.outputs_match);
    assert_eq!(report.partitions, 0);
    assert!(report.result.is_empty());
}
