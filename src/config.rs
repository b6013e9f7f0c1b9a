//! Project configuration module.
//!
//! Handles loading, validating, and merging `touristdb.toml`. Stock defaults
//! are serialized to a TOML table and the user file is merged on top, so a
//! project file only names the values it changes.
//!
//! ## Config File Location
//!
//! ```text
//! project/
//! ├── touristdb.toml           # optional, overrides stock defaults
//! ├── datafiles/
//! │   └── datafile-rudy/
//! ├── generated/
//! └── compressed/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! database_dir = "datafiles"
//! output_dir = "generated"
//! archive_dir = "compressed"
//! base_language = "pl"
//!
//! [images]
//! quality = "compressed"    # "compressed" | "original"
//! mini_icons = true
//! icon_prefix = "ic_"
//! mini_icon_size = 128
//!
//! [optimize]
//! icon_size = 512
//! scale_percent = 25
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::images::Quality;
use crate::imaging::OptimizeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "touristdb.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `touristdb.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Directory holding `datafile-<region>` source trees.
    pub database_dir: PathBuf,
    /// Directory bundles are materialized into.
    pub output_dir: PathBuf,
    /// Directory archives are written to.
    pub archive_dir: PathBuf,
    /// Language every localized field must exist in.
    pub base_language: String,
    pub images: ImagesConfig,
    pub optimize: OptimizeSettings,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            database_dir: PathBuf::from("datafiles"),
            output_dir: PathBuf::from("generated"),
            archive_dir: PathBuf::from("compressed"),
            base_language: "pl".to_string(),
            images: ImagesConfig::default(),
            optimize: OptimizeSettings::default(),
        }
    }
}

impl ProjectConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_language.trim().is_empty() {
            return Err(ConfigError::Validation(
                "base_language must not be empty".into(),
            ));
        }
        if self.images.icon_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "images.icon_prefix must not be empty".into(),
            ));
        }
        if self.images.mini_icon_size == 0 {
            return Err(ConfigError::Validation(
                "images.mini_icon_size must be non-zero".into(),
            ));
        }
        if self.optimize.icon_size == 0 {
            return Err(ConfigError::Validation(
                "optimize.icon_size must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.optimize.scale_percent) {
            return Err(ConfigError::Validation(
                "optimize.scale_percent must be 1-100".into(),
            ));
        }
        Ok(())
    }

    /// Settings for `optimize`, with icon production switched by `icons`.
    pub fn optimize_config(&self, icons: bool) -> OptimizeConfig {
        OptimizeConfig {
            icon_size: self.optimize.icon_size,
            scale_percent: self.optimize.scale_percent,
            icons,
            icon_prefix: self.images.icon_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Which image tier the datafile references.
    pub quality: Quality,
    pub mini_icons: bool,
    pub icon_prefix: String,
    pub mini_icon_size: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            quality: Quality::Compressed,
            mini_icons: true,
            icon_prefix: "ic_".to_string(),
            mini_icon_size: 128,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeSettings {
    pub icon_size: u32,
    pub scale_percent: u32,
}

impl Default for OptimizeSettings {
    fn default() -> Self {
        let stock = OptimizeConfig::default();
        Self {
            icon_size: stock.icon_size,
            scale_percent: stock.scale_percent,
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ProjectConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `touristdb.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `touristdb.toml` in `dir`, merged over stock defaults
/// and validated.
pub fn load_config(dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: ProjectConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `touristdb.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# touristdb configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Region sources live in <database_dir>/datafile-<region>.
database_dir = "datafiles"

# Generated bundles are written to <output_dir>/<region>.
output_dir = "generated"

# Archives are written to <archive_dir>/<region>.zip.
archive_dir = "compressed"

# Every localized field must exist in this language.
# Other languages are picked up from the directories that exist.
base_language = "pl"

# ---------------------------------------------------------------------------
# Images referenced by the datafile
# ---------------------------------------------------------------------------
[images]
# "compressed" reads images/compressed/, "original" reads images/original/.
quality = "compressed"

# Also write mini_<name> squares for every image whose name starts with
# icon_prefix.
mini_icons = true
icon_prefix = "ic_"
mini_icon_size = 128

# ---------------------------------------------------------------------------
# Place image optimization (the optimize command)
# ---------------------------------------------------------------------------
[optimize]
# Edge of the square icon, in pixels.
icon_size = 512

# Content images are scaled to this percentage of the original.
scale_percent = 25
"##
}
