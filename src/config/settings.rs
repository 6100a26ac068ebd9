//! User settings for simple-audit
//!
//! Deployment-wide defaults for audit policies and presentation.

use serde::{Deserialize, Serialize};

use super::paths::AuditPaths;
use crate::audit::{AuditTrigger, NameStrategy};
use crate::error::AuditError;

/// User settings for simple-audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Name strategy for policies built from settings
    #[serde(default)]
    pub default_name_strategy: NameStrategy,

    /// Update trigger for policies built from settings
    #[serde(default)]
    pub default_trigger: AuditTrigger,

    /// Log filter used when neither RUST_LOG nor -v is given
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Timestamp format for terminal output (strftime format)
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_name_strategy: NameStrategy::default(),
            default_trigger: AuditTrigger::default(),
            log_level: default_log_level(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_or_create(paths: &AuditPaths) -> Result<Self, AuditError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                AuditError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                AuditError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Defaults stay in memory until `save`
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AuditPaths) -> Result<(), AuditError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            AuditError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(&settings_path, contents).map_err(|e| {
            AuditError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
