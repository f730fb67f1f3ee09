use std::path::Path;

use super::{CommandSpec, PlatformExtensions};
use crate::error::MetricError;
use crate::system::snapshot::BatteryReading;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_temperature(_thermal_zone: &Path) -> Result<f32, MetricError> {
        Err(MetricError::Unsupported("CPU temperature"))
    }

    fn battery(_power_supply_dir: &Path) -> Result<Option<BatteryReading>, MetricError> {
        Ok(None)
    }

    fn drop_caches_command() -> Option<CommandSpec> {
        None
    }

    fn power_profile_command(_mode: &str) -> Option<CommandSpec> {
        None
    }
}
