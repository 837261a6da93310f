use crate::config::Config;
use crate::config::migrate::{migrate_config_file, missing_fields};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(cfg: &Config) -> AppResult<()> {
        let yaml = serde_yaml::to_string(cfg).map_err(|e| AppError::Config(e.to_string()))?;
        println!("📄 Current configuration:\n");
        println!("{yaml}");
        Ok(())
    }

    /// Report fields missing from the config file. Returns how many.
    pub fn check(path: &Path) -> AppResult<usize> {
        if !path.exists() {
            warning(format!(
                "No configuration file at {}, defaults are in use.",
                path.display()
            ));
            return Ok(0);
        }

        let missing = missing_fields(path)?;
        if missing.is_empty() {
            success("Configuration file is complete.");
        } else {
            warning(format!("Missing fields: {}", missing.join(", ")));
            info("Run `config --migrate` to add them with default values.");
        }
        Ok(missing.len())
    }

    pub fn migrate(path: &Path) -> AppResult<Vec<String>> {
        if !path.exists() {
            warning(format!("No configuration file at {}.", path.display()));
            return Ok(Vec::new());
        }

        let added = migrate_config_file(path)?;
        if added.is_empty() {
            info("Configuration already up to date.");
        } else {
            success(format!("Added fields: {}", added.join(", ")));
        }
        Ok(added)
    }

    /// Open the config file in `editor`, `$EDITOR`/`$VISUAL`, or the
    /// platform default, falling back to the default when the requested
    /// editor fails.
    pub fn edit(path: &Path, editor: Option<&str>) -> AppResult<()> {
        let default_editor = std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            });
        let requested = editor.map(str::to_string).unwrap_or_else(|| default_editor.clone());

        let ok = |ed: &str| {
            Command::new(ed)
                .arg(path)
                .status()
                .map(|s| s.success())
                .unwrap_or(false)
        };

        if ok(&requested) {
            success(format!("Configuration file edited using '{requested}'"));
            return Ok(());
        }

        warning(format!(
            "Editor '{requested}' not available, falling back to '{default_editor}'"
        ));
        if requested != default_editor && ok(&default_editor) {
            success(format!(
                "Configuration file edited using fallback '{default_editor}'"
            ));
            return Ok(());
        }

        Err(AppError::Config(format!(
            "failed to edit {} with '{default_editor}'",
            path.display()
        )))
    }
}
