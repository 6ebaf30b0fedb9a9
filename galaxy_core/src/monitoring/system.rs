//! Host resource sampling for the `/health` payload

use crate::config::MetricsConfig;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use nix::sys::statvfs::statvfs;
use sysinfo::System;
use tracing::debug;

/// sysinfo needs at least this long between two CPU refreshes to report a
/// meaningful usage figure.
const MIN_CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemSnapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

pub struct SystemMonitor {
    cpu_sample_interval: Duration,
    disk_path: PathBuf,
}

impl SystemMonitor {
    pub fn new(cpu_sample_interval: Duration) -> Self {
        Self {
            cpu_sample_interval: cpu_sample_interval.max(MIN_CPU_SAMPLE_INTERVAL),
            disk_path: PathBuf::from("/"),
        }
    }

    pub fn from_config(config: &MetricsConfig) -> Self {
        Self::new(config.cpu_sample_interval())
    }

    /// Reports disk usage for the filesystem holding `path` instead of `/`.
    pub fn with_disk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.disk_path = path.into();
        self
    }

    pub fn cpu_sample_interval(&self) -> Duration {
        self.cpu_sample_interval
    }

    /// Samples CPU over the configured window, then reads memory and disk.
    /// The caller is suspended for the whole window.
    pub async fn snapshot(&self) -> Result<SystemSnapshot> {
        let mut system = System::new();

        system.refresh_cpu();
        tokio::time::sleep(self.cpu_sample_interval).await;
        system.refresh_cpu();
        system.refresh_memory();

        let cpu_percent = f64::from(system.global_cpu_info().cpu_usage());

        let memory_percent = usage_percent(system.used_memory(), system.total_memory())
            .ok_or_else(|| AppError::SystemMetrics("total memory reported as 0".to_string()))?;

        let disk_percent = self.disk_percent()?;

        debug!(
            "Sampled system: CPU: {:.1}%, Memory: {:.1}%, Disk: {:.1}%",
            cpu_percent, memory_percent, disk_percent
        );

        Ok(SystemSnapshot {
            cpu_percent,
            memory_percent,
            disk_percent,
        })
    }

    /// Used blocks over total blocks, counting root-reserved blocks as free.
    fn disk_percent(&self) -> Result<f64> {
        let stat = statvfs(self.disk_path.as_path()).map_err(|e| {
            AppError::SystemMetrics(format!("statvfs {} failed: {}", self.disk_path.display(), e))
        })?;

        let total = u64::from(stat.blocks());
        let used = total.saturating_sub(u64::from(stat.blocks_free()));

        usage_percent(used, total).ok_or_else(|| {
            AppError::SystemMetrics(format!(
                "filesystem at {} reports zero capacity",
                self.disk_path.display()
            ))
        })
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::from_config(&MetricsConfig::default())
    }
}

fn usage_percent(used: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some((used as f64 / total as f64) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_percent() {
        assert_eq!(usage_percent(50, 200), Some(25.0));
        assert_eq!(usage_percent(0, 10), Some(0.0));
        assert_eq!(usage_percent(10, 10), Some(100.0));
        assert_eq!(usage_percent(1, 0), None);
    }

    #[test]
    fn test_sample_interval_has_a_floor() {
        let monitor = SystemMonitor::new(Duration::from_millis(1));
        assert_eq!(monitor.cpu_sample_interval(), MIN_CPU_SAMPLE_INTERVAL);

        let monitor = SystemMonitor::default();
        assert_eq!(monitor.cpu_sample_interval(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_snapshot_values_are_percentages() {
        let monitor = SystemMonitor::new(Duration::from_millis(200));
        let snapshot = monitor.snapshot().await.expect("host metrics should be readable");

        for value in [snapshot.cpu_percent, snapshot.memory_percent, snapshot.disk_percent] {
            assert!((0.0..=100.0).contains(&value), "{} out of range", value);
        }
    }

    #[tokio::test]
    async fn test_missing_disk_path_is_an_error() {
        let monitor = SystemMonitor::new(Duration::from_millis(200))
            .with_disk_path("/definitely/not/a/real/path");

        match monitor.snapshot().await {
            Err(AppError::SystemMetrics(msg)) => assert!(msg.contains("statvfs")),
            other => panic!("expected a system metrics error, got {:?}", other),
        }
    }

    #[test]
    fn test_disk_percent_is_used_over_total_blocks() {
        let monitor = SystemMonitor::default();
        let stat = statvfs("/").unwrap();
        let total = u64::from(stat.blocks()) as f64;
        let free = u64::from(stat.blocks_free()) as f64;
        let expected = (total - free) / total * 100.0;

        let reported = monitor.disk_percent().unwrap();

        assert!(
            (reported - expected).abs() < 0.5,
            "reported {} vs used/total {}",
            reported,
            expected
        );
    }

    #[tokio::test]
    async fn test_snapshot_blocks_for_sample_window() {
        let monitor = SystemMonitor::new(Duration::from_millis(300));
        let start = std::time::Instant::now();

        let _ = monitor.snapshot().await;

        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
