use crate::domain::model::{ExportFormat, ExportOutput};
use std::fmt;
#[cfg(feature = "cli")]
use std::sync::{Arc, Mutex};
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

/// A step of a download that the monitor reports on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportPhase<'a> {
    Start { format: ExportFormat, records: usize },
    Encoded { format: ExportFormat, bytes: usize },
    Written { file_name: &'a str },
}

impl fmt::Display for ExportPhase<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportPhase::Start { format, records } => {
                write!(f, "Start {} export ({} records)", format, records)
            }
            ExportPhase::Encoded { format, bytes } => {
                write!(f, "Encoded {} ({} bytes)", format, bytes)
            }
            ExportPhase::Written { file_name } => write!(f, "Written {}", file_name),
        }
    }
}

/// Encoded bytes per second, `None` before any time has passed.
pub fn throughput_kib_per_sec(bytes: usize, elapsed_secs: f64) -> Option<f64> {
    if elapsed_secs <= 0.0 {
        return None;
    }
    Some(bytes as f64 / 1024.0 / elapsed_secs)
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Arc<Mutex<System>>,
    pid: Option<Pid>,
    start_time: Instant,
    peak_memory: Arc<Mutex<u64>>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_with_specifics(RefreshKind::everything());

        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("System monitoring unavailable: {}", e);
                None
            }
        };

        if enabled {
            // 初始刷新
            system.refresh_all();
        }

        Self {
            system: Arc::new(Mutex::new(system)),
            pid,
            start_time: Instant::now(),
            peak_memory: Arc::new(Mutex::new(0)),
            enabled: enabled && pid.is_some(),
        }
    }

    pub fn get_stats(&self) -> Option<SystemStats> {
        if !self.enabled {
            return None;
        }

        let mut system = self.system.lock().ok()?;
        system.refresh_all();

        let process = system.process(self.pid?)?;
        let memory_mb = process.memory() / 1024 / 1024;

        // 更新峰值記憶體
        let mut peak = self.peak_memory.lock().ok()?;
        if memory_mb > *peak {
            *peak = memory_mb;
        }

        Some(SystemStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb: *peak,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: ExportPhase<'_>) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                phase,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.elapsed_time
            );
        }
    }

    pub fn log_final_stats(&self, output: &ExportOutput) {
        if let Some(stats) = self.get_stats() {
            let throughput =
                throughput_kib_per_sec(output.bytes.len(), stats.elapsed_time.as_secs_f64())
                    .unwrap_or_default();
            tracing::info!(
                "📊 {} done - Total Time: {:?}, Peak Memory: {}MB, Throughput: {:.1}KiB/s",
                output.file_name,
                stats.elapsed_time,
                stats.peak_memory_mb,
                throughput
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 為非CLI環境提供空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: ExportPhase<'_>) {}

    pub fn log_final_stats(&self, _output: &ExportOutput) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
