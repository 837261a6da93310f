use crate::errors::{AppError, AppResult};
use crate::geofence::{GeofenceConfig, WatchOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod migrate; // use submodule at src/config/migrate.rs

const APP_DIR: &str = "maintdesk";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_radius")]
    pub default_geofence_radius_meters: f64,
    #[serde(default = "default_true")]
    pub geofence_enabled_by_default: bool,
    #[serde(default = "default_true")]
    pub location_high_accuracy: bool,
    #[serde(default = "default_timeout_ms")]
    pub location_timeout_ms: u64,
    #[serde(default)]
    pub location_maximum_age_ms: u64,
    #[serde(default = "default_poll_secs")]
    pub geofence_poll_secs: u64,
    #[serde(default = "default_ping_secs")]
    pub location_ping_secs: u64,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_radius() -> f64 {
    200.0
}
fn default_true() -> bool {
    true
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_poll_secs() -> u64 {
    5
}
fn default_ping_secs() -> u64 {
    60
}
fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    fn with_database(db_path: PathBuf) -> Self {
        Self {
            database: db_path.to_string_lossy().to_string(),
            default_geofence_radius_meters: default_radius(),
            geofence_enabled_by_default: true,
            location_high_accuracy: true,
            location_timeout_ms: default_timeout_ms(),
            location_maximum_age_ms: 0,
            geofence_poll_secs: default_poll_secs(),
            location_ping_secs: default_ping_secs(),
            date_format: default_date_format(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(format!(".{APP_DIR}"))
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join(format!("{APP_DIR}.conf"))
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join(format!("{APP_DIR}.sqlite"))
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    /// Geofence parameters used when the settings store has none.
    pub fn geofence_fallback(&self) -> GeofenceConfig {
        GeofenceConfig {
            radius_meters: self.default_geofence_radius_meters,
            enabled: self.geofence_enabled_by_default,
        }
    }

    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            enable_high_accuracy: self.location_high_accuracy,
            timeout: Duration::from_millis(self.location_timeout_ms),
            maximum_age: Duration::from_millis(self.location_maximum_age_ms),
        }
    }

    pub fn geofence_poll(&self) -> Duration {
        Duration::from_secs(self.geofence_poll_secs.max(1))
    }

    pub fn location_ping(&self) -> Duration {
        Duration::from_secs(self.location_ping_secs.max(1))
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let config = Self::with_database(db_path.clone());

        // Write config file
        if !is_test {
            fs::create_dir_all(&dir)?;
            let yaml = serde_yaml::to_string(&config).map_err(|_| AppError::ConfigSave)?;
            fs::write(Self::config_file(), yaml)?;
            println!("✅ Config file: {}", Self::config_file().display());
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: Config = serde_yaml::from_str("database: /tmp/x.sqlite\n").unwrap();
        assert_eq!(cfg.default_geofence_radius_meters, 200.0);
        assert!(cfg.geofence_enabled_by_default);
        assert_eq!(cfg.location_timeout_ms, 10_000);
        assert_eq!(cfg.location_maximum_age_ms, 0);
        assert_eq!(cfg.geofence_poll_secs, 5);
        assert_eq!(cfg.location_ping_secs, 60);
    }

    #[test]
    fn watch_options_follow_config() {
        let mut cfg = Config::with_database(PathBuf::from("db.sqlite"));
        cfg.location_high_accuracy = false;
        cfg.location_timeout_ms = 2_500;
        let opts = cfg.watch_options();
        assert!(!opts.enable_high_accuracy);
        assert_eq!(opts.timeout, Duration::from_millis(2_500));
        assert_eq!(opts.maximum_age, Duration::ZERO);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("maintdesk_missing_config_for_test.conf");
        let _ = fs::remove_file(&path);
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.default_geofence_radius_meters, 200.0);
    }
}
