//! Worker capacity detection.
//!
//! Capacity is resolved through an ordered list of probes, first success wins:
//! 1. cgroup v1 CPU quota (`cpu/cpu.cfs_quota_us` / `cpu/cpu.cfs_period_us`)
//! 2. cgroup v2 CPU quota (`cpu.max`)
//! 3. Logical cores reported by the runtime
//! 4. A fixed fallback ([`DEFAULT_CAPACITY`] unless configured otherwise)
//!
//! Probe failures are logged and absorbed; [`CapacityDetector::detect`]
//! always returns at least 1. Nothing is cached between calls, so a resized
//! container is picked up on the next run.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{Result, TrackDistError};

/// Worker count used when every probe fails.
pub const DEFAULT_CAPACITY: usize = 3;

/// Conventional mount point of the cgroup filesystem.
pub const CGROUP_ROOT: &str = "/sys/fs/cgroup";

const CGROUP_V1_QUOTA: &str = "cpu/cpu.cfs_quota_us";
const CGROUP_V1_PERIOD: &str = "cpu/cpu.cfs_period_us";
const CGROUP_V2_MAX: &str = "cpu.max";

/// A single source of worker capacity.
///
/// Probes are stateless; one probe failing never affects another.
pub trait CapacityProbe: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Return a positive worker count or explain why none is available.
    fn probe(&self) -> Result<usize>;
}

/// Reads the cgroup v1 CFS quota and period.
#[derive(Debug, Clone)]
pub struct CgroupV1Probe {
    root: PathBuf,
}

impl CgroupV1Probe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CapacityProbe for CgroupV1Probe {
    fn name(&self) -> &str {
        "cgroup-v1"
    }

    fn probe(&self) -> Result<usize> {
        let quota = read_number(self.name(), &self.root.join(CGROUP_V1_QUOTA))?;
        let period = read_number(self.name(), &self.root.join(CGROUP_V1_PERIOD))?;
        quota_to_capacity(self.name(), quota, period)
    }
}

/// Reads the cgroup v2 `cpu.max` file (`"<quota> <period>"` or `"max <period>"`).
#[derive(Debug, Clone)]
pub struct CgroupV2Probe {
    root: PathBuf,
}

impl CgroupV2Probe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CapacityProbe for CgroupV2Probe {
    fn name(&self) -> &str {
        "cgroup-v2"
    }

    fn probe(&self) -> Result<usize> {
        let path = self.root.join(CGROUP_V2_MAX);
        let content = fs::read_to_string(&path).map_err(|e| {
            TrackDistError::capacity(self.name(), format!("{}: {}", path.display(), e))
        })?;

        let mut fields = content.split_whitespace();
        let (quota, period) = match (fields.next(), fields.next()) {
            (Some(q), Some(p)) => (q, p),
            _ => {
                return Err(TrackDistError::capacity(
                    self.name(),
                    format!("malformed {}: {:?}", path.display(), content.trim()),
                ));
            }
        };

        if quota == "max" {
            return Err(TrackDistError::capacity(self.name(), "quota is unbounded"));
        }

        let quota = parse_number(self.name(), quota)?;
        let period = parse_number(self.name(), period)?;
        quota_to_capacity(self.name(), quota, period)
    }
}

/// Logical cores as reported by the standard library.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicalCoresProbe;

impl CapacityProbe for LogicalCoresProbe {
    fn name(&self) -> &str {
        "logical-cores"
    }

    fn probe(&self) -> Result<usize> {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .map_err(|e| TrackDistError::capacity(self.name(), e.to_string()))
    }
}

/// Resolves the number of workers available for one run.
pub struct CapacityDetector {
    probes: Vec<Box<dyn CapacityProbe>>,
    fallback: usize,
}

impl Default for CapacityDetector {
    fn default() -> Self {
        Self::new(CGROUP_ROOT)
    }
}

impl std::fmt::Debug for CapacityDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.probes.iter().map(|p| p.name()).collect();
        f.debug_struct("CapacityDetector")
            .field("probes", &names)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl CapacityDetector {
    /// Standard probe chain rooted at the given cgroup mount.
    pub fn new(cgroup_root: impl AsRef<Path>) -> Self {
        let root = cgroup_root.as_ref();
        Self::with_probes(
            vec![
                Box::new(CgroupV1Probe::new(root)),
                Box::new(CgroupV2Probe::new(root)),
                Box::new(LogicalCoresProbe),
            ],
            DEFAULT_CAPACITY,
        )
    }

    /// Custom probe chain. A fallback of 0 is raised to 1.
    pub fn with_probes(probes: Vec<Box<dyn CapacityProbe>>, fallback: usize) -> Self {
        Self {
            probes,
            fallback: fallback.max(1),
        }
    }

    /// Detector configured from an [`EngineConfig`](crate::EngineConfig).
    pub fn from_config(config: &crate::EngineConfig) -> Self {
        let mut detector = Self::new(&config.cgroup_root);
        detector.fallback = config.fallback_capacity.max(1);
        detector
    }

    /// Worker count used when every probe fails.
    pub fn fallback(&self) -> usize {
        self.fallback
    }

    /// Run the probe chain. Always returns at least 1.
    pub fn detect(&self) -> usize {
        for probe in &self.probes {
            match probe.probe() {
                Ok(n) if n >= 1 => {
                    info!("[Capacity] {} found {} CPUs", probe.name(), n);
                    return n;
                }
                Ok(n) => {
                    warn!("[Capacity] {} returned non-positive count {}", probe.name(), n);
                }
                Err(e) => {
                    warn!("[Capacity] {}", e);
                }
            }
        }

        info!(
            "[Capacity] All probes failed, using fallback of {} CPUs",
            self.fallback
        );
        self.fallback
    }
}

fn read_number(probe: &str, path: &Path) -> Result<i64> {
    let content = fs::read_to_string(path)
        .map_err(|e| TrackDistError::capacity(probe, format!("{}: {}", path.display(), e)))?;
    parse_number(probe, content.trim())
}

fn parse_number(probe: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|e| TrackDistError::capacity(probe, format!("cannot parse {:?}: {}", value, e)))
}

/// Whole CPUs granted by a quota. Negative quotas mean unbounded.
fn quota_to_capacity(probe: &str, quota: i64, period: i64) -> Result<usize> {
    if quota < 0 {
        return Err(TrackDistError::capacity(probe, "quota is unbounded"));
    }
    if quota == 0 || period <= 0 {
        return Err(TrackDistError::capacity(
            probe,
            format!("invalid quota/period {}/{}", quota, period),
        ));
    }
    let cpus = quota / period;
    if cpus < 1 {
        return Err(TrackDistError::capacity(
            probe,
            format!("quota {}/{} grants less than one CPU", quota, period),
        ));
    }
    Ok(cpus as usize)
}
