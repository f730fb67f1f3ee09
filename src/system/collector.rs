use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sysinfo::{Disks, Networks, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::{debug, info, warn};

use super::network::NetCounters;
use super::platform;
use super::process::{ProcessRow, top_by_cpu};
use super::snapshot::{BatteryReading, DiskUsage, Snapshot, percent_of};
use crate::error::MetricError;

#[derive(Debug, Clone)]
pub struct SensorPaths {
    pub thermal_zone: PathBuf,
    pub power_supply: PathBuf,
    pub disk_mount: PathBuf,
}

impl Default for SensorPaths {
    fn default() -> Self {
        SensorPaths {
            thermal_zone: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
            power_supply: PathBuf::from("/sys/class/power_supply"),
            disk_mount: PathBuf::from("/"),
        }
    }
}

pub struct Collector {
    sys: System,
    networks: Networks,
    disks: Disks,
    sensors: SensorPaths,
    top_processes: usize,
    degraded: HashSet<&'static str>,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(SensorPaths::default(), 10)
    }
}

impl Collector {
    pub fn new(sensors: SensorPaths, top_processes: usize) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        Collector {
            sys,
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            sensors,
            top_processes,
            degraded: HashSet::new(),
        }
    }

    /// Current cumulative counters, summed over every interface.
    pub fn network_counters(&self) -> NetCounters {
        self.networks
            .iter()
            .fold(NetCounters::default(), |acc, (_, data)| NetCounters {
                sent: acc.sent.saturating_add(data.total_transmitted()),
                received: acc.received.saturating_add(data.total_received()),
            })
    }

    pub fn sample(&mut self) -> Snapshot {
        let _span = tracing::debug_span!("collector.sample").entered();

        self.sys.refresh_memory();
        self.sys.refresh_cpu_all();
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        self.networks.refresh(true);
        self.disks.refresh(true);

        let cpu_temp_c = {
            let reading = platform::cpu_temperature(&self.sensors.thermal_zone);
            self.settle("cpu_temperature", reading, 0.0)
        };
        let battery = {
            let reading = platform::battery(&self.sensors.power_supply);
            self.settle("battery", reading, None)
        };

        Snapshot {
            cpu_percent: self.sys.global_cpu_usage().clamp(0.0, 100.0),
            cpu_temp_c,
            memory_used: self.sys.used_memory(),
            memory_total: self.sys.total_memory(),
            disk: self.root_disk(),
            network: self.network_counters(),
            battery,
            processes: self.top_processes(),
            uptime_secs: uptime_secs(),
        }
    }

    /// Substitutes `fallback` for an unreadable source and logs only on
    /// state changes so a missing sensor doesn't flood the log every tick.
    fn settle<T>(&mut self, source: &'static str, reading: Result<T, MetricError>, fallback: T) -> T {
        match reading {
            Ok(value) => {
                if self.degraded.remove(source) {
                    info!(source, "metric source recovered");
                }
                value
            }
            Err(err) => {
                if self.degraded.insert(source) {
                    warn!(source, error = %err, "metric source unavailable, using default");
                } else {
                    debug!(source, error = %err, "metric source still unavailable");
                }
                fallback
            }
        }
    }

    fn root_disk(&mut self) -> DiskUsage {
        let mount = &self.sensors.disk_mount;
        let usage = self
            .disks
            .iter()
            .find(|d| d.mount_point() == mount.as_path())
            .map(|d| {
                let total = d.total_space();
                DiskUsage {
                    total,
                    used: total.saturating_sub(d.available_space()),
                }
            });
        let reading = usage.ok_or(MetricError::Unsupported("disk usage for the configured mount"));
        self.settle("disk", reading, DiskUsage::default())
    }

    fn top_processes(&self) -> Vec<ProcessRow> {
        let total_memory = self.sys.total_memory();
        let rows = self
            .sys
            .processes()
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| ProcessRow {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().to_string(),
                cpu_percent: process.cpu_usage(),
                mem_percent: percent_of(process.memory(), total_memory) as f32,
            })
            .collect();
        top_by_cpu(rows, self.top_processes)
    }
}

fn uptime_secs() -> u64 {
    let boot = System::boot_time();
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(now) if boot > 0 => now.as_secs().saturating_sub(boot),
        _ => System::uptime(),
    }
}
