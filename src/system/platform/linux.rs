use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{CommandSpec, PlatformExtensions};
use crate::error::MetricError;
use crate::system::snapshot::{BatteryReading, BatteryStatus, BatteryTime};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_temperature(thermal_zone: &Path) -> Result<f32, MetricError> {
        // thermal_zone*/temp reports millidegrees Celsius
        let raw = read_trimmed(thermal_zone)?;
        let milli: i64 = raw.parse().map_err(|_| MetricError::Parse {
            path: thermal_zone.to_path_buf(),
            value: raw.clone(),
        })?;
        Ok((milli as f32 / 1000.0).max(0.0))
    }

    fn battery(power_supply_dir: &Path) -> Result<Option<BatteryReading>, MetricError> {
        let entries = match fs::read_dir(power_supply_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(MetricError::Read {
                    path: power_supply_dir.to_path_buf(),
                    source,
                });
            }
        };

        let mut batteries: Vec<PathBuf> = Vec::new();
        let mut adapters: Vec<PathBuf> = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with("BAT") {
                batteries.push(entry.path());
            } else if name.starts_with("AC") || name.starts_with("ADP") {
                adapters.push(entry.path());
            }
        }
        batteries.sort();

        let Some(battery) = batteries.first() else {
            return Ok(None);
        };

        let capacity_path = battery.join("capacity");
        let raw = read_trimmed(&capacity_path)?;
        let percent: f32 = raw.parse().map_err(|_| MetricError::Parse {
            path: capacity_path.clone(),
            value: raw.clone(),
        })?;

        let status = read_trimmed(&battery.join("status"))
            .map(|s| BatteryStatus::from_sysfs(&s))
            .unwrap_or(BatteryStatus::Unknown);

        let on_ac = adapters
            .iter()
            .any(|adapter| read_trimmed(&adapter.join("online")).is_ok_and(|v| v == "1"));
        let plugged = on_ac
            || matches!(
                status,
                BatteryStatus::Charging | BatteryStatus::Full | BatteryStatus::NotCharging
            );

        let time = if plugged {
            BatteryTime::PluggedIn
        } else {
            time_to_empty(battery)
                .map(BatteryTime::Remaining)
                .unwrap_or(BatteryTime::Unknown)
        };

        Ok(Some(BatteryReading {
            percent: percent.clamp(0.0, 100.0),
            plugged,
            status,
            time,
        }))
    }

    fn drop_caches_command() -> Option<CommandSpec> {
        Some(CommandSpec::new(
            "sh",
            &["-c", "sync; echo 3 > /proc/sys/vm/drop_caches"],
        ))
    }

    fn power_profile_command(mode: &str) -> Option<CommandSpec> {
        Some(CommandSpec::new("powerprofilesctl", &["set", mode]))
    }
}

fn read_trimmed(path: &Path) -> Result<String, MetricError> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|source| MetricError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn read_u64(path: &Path) -> Option<u64> {
    read_trimmed(path).ok()?.parse().ok()
}

/// Remaining runtime from energy (µWh / µW) or charge (µAh / µA) counters.
fn time_to_empty(battery: &Path) -> Option<Duration> {
    let pairs = [("energy_now", "power_now"), ("charge_now", "current_now")];
    for (level, rate) in pairs {
        let (Some(level), Some(rate)) = (
            read_u64(&battery.join(level)),
            read_u64(&battery.join(rate)),
        ) else {
            continue;
        };
        if rate == 0 {
            continue;
        }
        let hours = level as f64 / rate as f64;
        return Some(Duration::from_secs((hours * 3600.0) as u64));
    }
    None
}
