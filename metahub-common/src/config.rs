//! Write settings and configuration file resolution
//!
//! The engine never reads ambient global state: callers resolve a
//! [`TomlConfig`] once, then thread its [`MetadataSettings`] snapshot into
//! every write call.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable consulted when no explicit config path is given
pub const CONFIG_ENV_VAR: &str = "METAHUB_CONFIG";

/// File name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "metahub.toml";

/// Which field categories may be written to metadata sinks, plus constant
/// fields forwarded verbatim to them.
///
/// Titles and comments share `save_comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    pub save_comments: bool,
    pub save_date_time: bool,
    pub save_pick_label: bool,
    pub save_color_label: bool,
    pub save_rating: bool,
    pub save_template: bool,
    pub save_tags: bool,
    pub save_face_tags: bool,
    /// Queue file writes for records instead of performing them immediately
    pub use_lazy_sync: bool,
    /// Photographer name written alongside templates
    pub photographer: Option<String>,
    /// Credit line written alongside templates
    pub credit: Option<String>,
    /// Copyright notice written alongside templates
    pub copyright: Option<String>,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            save_comments: true,
            save_date_time: true,
            save_pick_label: true,
            save_color_label: true,
            save_rating: true,
            save_template: true,
            save_tags: true,
            save_face_tags: false,
            use_lazy_sync: false,
            photographer: None,
            credit: None,
            copyright: None,
        }
    }
}

impl MetadataSettings {
    /// Settings that permit nothing; useful as a base for selective tests
    pub fn nothing() -> Self {
        Self {
            save_comments: false,
            save_date_time: false,
            save_pick_label: false,
            save_color_label: false,
            save_rating: false,
            save_template: false,
            save_tags: false,
            save_face_tags: false,
            use_lazy_sync: false,
            photographer: None,
            credit: None,
            copyright: None,
        }
    }

    /// Per-category write permissions derived from these settings
    pub fn permissions(&self) -> FieldPermissions {
        FieldPermissions {
            titles: self.save_comments,
            comments: self.save_comments,
            date_time: self.save_date_time,
            pick_label: self.save_pick_label,
            color_label: self.save_color_label,
            rating: self.save_rating,
            template: self.save_template,
            tags: self.save_tags,
            face_tags: self.save_face_tags,
        }
    }
}

/// Per field group write permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPermissions {
    pub titles: bool,
    pub comments: bool,
    pub date_time: bool,
    pub pick_label: bool,
    pub color_label: bool,
    pub rating: bool,
    pub template: bool,
    pub tags: bool,
    pub face_tags: bool,
}

impl FieldPermissions {
    /// Everything writable
    pub fn all() -> Self {
        Self {
            titles: true,
            comments: true,
            date_time: true,
            pick_label: true,
            color_label: true,
            rating: true,
            template: true,
            tags: true,
            face_tags: true,
        }
    }

    /// Everything a database record stores; face regions live in their own table
    pub fn database() -> Self {
        Self {
            face_tags: false,
            ..Self::all()
        }
    }
}

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `METAHUB_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub metadata: MetadataSettings,
    pub logging: LoggingConfig,
}

/// Config file resolution following this priority order:
/// 1. Explicit path (command-line argument)
/// 2. Environment variable
/// 3. Platform config directory, if the file exists there
///
/// Returns `None` when no candidate exists; callers fall back to defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    let candidate = default_config_path()?;
    if candidate.exists() {
        Some(candidate)
    } else {
        None
    }
}

/// `<config dir>/metahub/metahub.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("metahub").join(CONFIG_FILE_NAME))
}

/// Parse a TOML configuration file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Resolve and load the configuration, degrading gracefully.
///
/// A missing file yields defaults with a warning. A file that exists but
/// cannot be parsed is an error.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = resolve_config_path(cli_arg, CONFIG_ENV_VAR) else {
        debug!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(path = ?path, "Config file not found, using compiled defaults");
        return Ok(TomlConfig::default());
    }

    let config = read_toml_config(&path)?;
    info!(path = ?path, "Loaded configuration");
    Ok(config)
}

/// Write configuration atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, target: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp = target.with_extension("toml.tmp");
    std::fs::write(&temp, content)?;
    std::fs::rename(&temp, target)?;
    Ok(())
}
