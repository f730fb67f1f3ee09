use std::path::Path;

use crate::error::MetricError;
use crate::system::snapshot::BatteryReading;

/// Program plus arguments for an OS maintenance command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Runs the command through `sudo -n` so a missing credential fails
    /// instead of prompting on the terminal the UI owns.
    pub fn elevated(self) -> Self {
        let mut args = vec!["-n".to_string(), self.program];
        args.extend(self.args);
        Self {
            program: "sudo".to_string(),
            args,
        }
    }

    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

pub trait PlatformExtensions {
    fn cpu_temperature(thermal_zone: &Path) -> Result<f32, MetricError>;
    fn battery(power_supply_dir: &Path) -> Result<Option<BatteryReading>, MetricError>;
    fn drop_caches_command() -> Option<CommandSpec>;
    fn power_profile_command(mode: &str) -> Option<CommandSpec>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn cpu_temperature(thermal_zone: &Path) -> Result<f32, MetricError> {
    platform_impl::Platform::cpu_temperature(thermal_zone)
}

pub fn battery(power_supply_dir: &Path) -> Result<Option<BatteryReading>, MetricError> {
    platform_impl::Platform::battery(power_supply_dir)
}

pub fn drop_caches_command() -> Option<CommandSpec> {
    platform_impl::Platform::drop_caches_command()
}

pub fn power_profile_command(mode: &str) -> Option<CommandSpec> {
    platform_impl::Platform::power_profile_command(mode)
}
