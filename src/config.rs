use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::KeyCode;
use serde::Deserialize;
use tracing::warn;

use crate::band::Thresholds;
use crate::system::collector::SensorPaths;
use crate::system::maintenance::{MaintenanceSettings, default_storage_dirs};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub thresholds: Thresholds,
    pub sensors: SensorsConfig,
    pub actions: ActionsConfig,
    pub colors: ColorsConfig,
    pub keybinds: KeybindsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub refresh_rate_ms: u64,
    pub history_length: usize,
    pub top_processes: usize,
    pub log_capacity: usize,
    pub default_power_mode: String,
    pub default_sort: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            refresh_rate_ms: 1000,
            history_length: 60,
            top_processes: 10,
            log_capacity: 200,
            default_power_mode: "balanced".to_string(),
            default_sort: "cpu".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub thermal_zone: PathBuf,
    pub power_supply_dir: PathBuf,
    pub disk_mount: PathBuf,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        let paths = SensorPaths::default();
        SensorsConfig {
            thermal_zone: paths.thermal_zone,
            power_supply_dir: paths.power_supply,
            disk_mount: paths.disk_mount,
        }
    }
}

impl SensorsConfig {
    pub fn paths(&self) -> SensorPaths {
        SensorPaths {
            thermal_zone: self.thermal_zone.clone(),
            power_supply: self.power_supply_dir.clone(),
            disk_mount: self.disk_mount.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    pub use_sudo: bool,
    pub timeout_secs: u64,
    /// Empty means the user cache directory plus the system temp directory.
    pub storage_dirs: Vec<PathBuf>,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        ActionsConfig {
            use_sudo: true,
            timeout_secs: 30,
            storage_dirs: Vec::new(),
        }
    }
}

impl ActionsConfig {
    pub fn settings(&self) -> MaintenanceSettings {
        let storage_dirs = if self.storage_dirs.is_empty() {
            default_storage_dirs()
        } else {
            self.storage_dirs.clone()
        };
        MaintenanceSettings {
            use_sudo: self.use_sudo,
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            storage_dirs,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub theme: String,
    pub color_support: String,
    pub nominal: String,
    pub elevated: String,
    pub critical: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        ColorsConfig {
            theme: "dark".to_string(),
            color_support: "auto".to_string(),
            nominal: "#4caf50".to_string(),
            elevated: "#ff9800".to_string(),
            critical: "#f44336".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub next_tab: String,
    pub prev_tab: String,
    pub kill: String,
    pub sort: String,
    pub reverse_sort: String,
    pub apply: String,
    pub clear_ram: String,
    pub clear_storage: String,
    pub refresh: String,
    pub help: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            next_tab: "Tab".to_string(),
            prev_tab: "BackTab".to_string(),
            kill: "k".to_string(),
            sort: "s".to_string(),
            reverse_sort: "r".to_string(),
            apply: "Enter".to_string(),
            clear_ram: "m".to_string(),
            clear_storage: "x".to_string(),
            refresh: "F5".to_string(),
            help: "?".to_string(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lonitor").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "invalid config, using defaults");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

pub fn parse_key(s: &str) -> Option<KeyCode> {
    match s {
        "Enter" => Some(KeyCode::Enter),
        "Esc" | "Escape" => Some(KeyCode::Esc),
        "Tab" => Some(KeyCode::Tab),
        "BackTab" => Some(KeyCode::BackTab),
        "Space" => Some(KeyCode::Char(' ')),
        "Backspace" => Some(KeyCode::Backspace),
        "Delete" | "Del" => Some(KeyCode::Delete),
        _ => {
            if let Some(n) = s.strip_prefix('F')
                && let Ok(n) = n.parse::<u8>()
            {
                return Some(KeyCode::F(n));
            }
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.refresh_rate_ms, 1000);
        assert_eq!(config.general.history_length, 60);
        assert_eq!(config.general.top_processes, 10);
        assert_eq!(config.thresholds.elevated, 60.0);
        assert_eq!(config.thresholds.critical, 85.0);
        assert_eq!(
            config.sensors.thermal_zone,
            PathBuf::from("/sys/class/thermal/thermal_zone0/temp")
        );
        assert!(config.actions.use_sudo);
        assert_eq!(config.colors.theme, "dark");
        assert_eq!(config.keybinds.quit, "q");
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
refresh_rate_ms = 500
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.refresh_rate_ms, 500);
        // Other fields should be defaults
        assert_eq!(config.general.history_length, 60);
        assert_eq!(config.thresholds.critical, 85.0);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[general]
refresh_rate_ms = 2000
top_processes = 15
default_power_mode = "performance"

[thresholds]
elevated = 50.0
critical = 90.0

[sensors]
thermal_zone = "/sys/class/thermal/thermal_zone3/temp"

[actions]
use_sudo = false
timeout_secs = 5
storage_dirs = ["/var/tmp/lonitor"]

[colors]
theme = "light"

[keybinds]
quit = "x"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.refresh_rate_ms, 2000);
        assert_eq!(config.general.top_processes, 15);
        assert_eq!(config.general.default_power_mode, "performance");
        assert_eq!(config.thresholds.elevated, 50.0);
        assert_eq!(
            config.sensors.thermal_zone,
            PathBuf::from("/sys/class/thermal/thermal_zone3/temp")
        );
        assert_eq!(config.sensors.disk_mount, PathBuf::from("/"));
        let settings = config.actions.settings();
        assert!(!settings.use_sudo);
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.storage_dirs, vec![PathBuf::from("/var/tmp/lonitor")]);
        assert_eq!(config.colors.theme, "light");
        assert_eq!(config.keybinds.quit, "x");
    }

    #[test]
    fn empty_storage_dirs_fall_back_to_defaults() {
        let settings = ActionsConfig::default().settings();
        assert!(settings.storage_dirs.contains(&std::env::temp_dir()));
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.general.refresh_rate_ms, 1000);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("lonitor_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.general.refresh_rate_ms, 1000);
        let _ = std::fs::remove_file(&temp);
    }

    #[test]
    fn parse_key_names() {
        assert_eq!(parse_key("Enter"), Some(KeyCode::Enter));
        assert_eq!(parse_key("F5"), Some(KeyCode::F(5)));
        assert_eq!(parse_key("F"), Some(KeyCode::Char('F')));
        assert_eq!(parse_key("k"), Some(KeyCode::Char('k')));
        assert_eq!(parse_key("nope"), None);
    }
}
