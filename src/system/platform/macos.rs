use std::path::Path;

use super::{CommandSpec, PlatformExtensions};
use crate::error::MetricError;
use crate::system::snapshot::BatteryReading;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_temperature(_thermal_zone: &Path) -> Result<f32, MetricError> {
        // No sysfs thermal zones; SMC access needs a private framework
        Err(MetricError::Unsupported("CPU temperature"))
    }

    fn battery(_power_supply_dir: &Path) -> Result<Option<BatteryReading>, MetricError> {
        Ok(None)
    }

    fn drop_caches_command() -> Option<CommandSpec> {
        Some(CommandSpec::new("purge", &[]))
    }

    fn power_profile_command(mode: &str) -> Option<CommandSpec> {
        // pmset only exposes a low-power toggle
        let value = match mode {
            "power-saver" => "1",
            _ => "0",
        };
        Some(CommandSpec::new("pmset", &["-a", "lowpowermode", value]))
    }
}
