use std::time::Duration;

use super::network::NetCounters;
use super::process::ProcessRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryStatus {
    Charging,
    Discharging,
    Full,
    NotCharging,
    Unknown,
}

impl BatteryStatus {
    pub fn from_sysfs(s: &str) -> Self {
        match s.trim() {
            "Charging" => BatteryStatus::Charging,
            "Discharging" => BatteryStatus::Discharging,
            "Full" => BatteryStatus::Full,
            "Not charging" => BatteryStatus::NotCharging,
            _ => BatteryStatus::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BatteryStatus::Charging => "Charging",
            BatteryStatus::Discharging => "Discharging",
            BatteryStatus::Full => "Full",
            BatteryStatus::NotCharging => "Not charging",
            BatteryStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryTime {
    PluggedIn,
    Unknown,
    Remaining(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryReading {
    pub percent: f32,
    pub plugged: bool,
    pub status: BatteryStatus,
    pub time: BatteryTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
}

impl DiskUsage {
    pub fn percent(&self) -> f64 {
        percent_of(self.used, self.total)
    }
}

/// One tick's worth of host telemetry.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub cpu_percent: f32,
    pub cpu_temp_c: f32,
    pub memory_used: u64,
    pub memory_total: u64,
    pub disk: DiskUsage,
    pub network: NetCounters,
    pub battery: Option<BatteryReading>,
    pub processes: Vec<ProcessRow>,
    pub uptime_secs: u64,
}

impl Snapshot {
    pub fn memory_percent(&self) -> f64 {
        percent_of(self.memory_used, self.memory_total)
    }
}

pub(crate) fn percent_of(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (used as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }
}
