//! Bring an existing YAML config file up to the current field set.
//!
//! Existing values are never touched; fields introduced by newer releases
//! are appended with their defaults.

use super::Config;
use crate::errors::{AppError, AppResult};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

fn read_mapping(path: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    let yaml: Value = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
    match yaml {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(format!(
            "{}: expected a mapping at top level",
            path.display()
        ))),
    }
}

fn default_mapping() -> AppResult<Mapping> {
    match serde_yaml::to_value(Config::default()).map_err(|_| AppError::ConfigSave)? {
        Value::Mapping(map) => Ok(map),
        _ => Err(AppError::ConfigSave),
    }
}

/// Names of the fields the file at `path` does not define.
pub fn missing_fields(path: &Path) -> AppResult<Vec<String>> {
    let current = read_mapping(path)?;
    let defaults = default_mapping()?;

    Ok(defaults
        .keys()
        .filter(|k| !current.contains_key(*k))
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect())
}

/// Add missing fields with default values. Returns the names added.
pub fn migrate_config_file(path: &Path) -> AppResult<Vec<String>> {
    let mut current = read_mapping(path)?;
    let defaults = default_mapping()?;
    let mut added = Vec::new();

    for (key, value) in defaults {
        if !current.contains_key(&key) {
            if let Some(name) = key.as_str() {
                added.push(name.to_string());
            }
            current.insert(key, value);
        }
    }

    if !added.is_empty() {
        let serialized =
            serde_yaml::to_string(&Value::Mapping(current)).map_err(|_| AppError::ConfigSave)?;
        fs::write(path, serialized)?;
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_conf(name: &str, body: &str) -> std::path::PathBuf {
        let path = env::temp_dir().join(format!("{name}_maintdesk.conf"));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn migrate_adds_missing_and_keeps_existing() {
        let path = temp_conf(
            "cfg_migrate",
            "database: /srv/md.sqlite\ndefault_geofence_radius_meters: 350.0\n",
        );

        let missing = missing_fields(&path).unwrap();
        assert!(missing.contains(&"location_ping_secs".to_string()));
        assert!(!missing.contains(&"database".to_string()));

        let added = migrate_config_file(&path).unwrap();
        assert_eq!(added, missing);

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.database, "/srv/md.sqlite");
        assert_eq!(cfg.default_geofence_radius_meters, 350.0);
        assert!(missing_fields(&path).unwrap().is_empty());

        // second run is a no-op
        assert!(migrate_config_file(&path).unwrap().is_empty());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn non_mapping_file_is_rejected() {
        let path = temp_conf("cfg_list", "- a\n- b\n");
        assert!(matches!(missing_fields(&path), Err(AppError::Config(_))));
        fs::remove_file(&path).ok();
    }
}
