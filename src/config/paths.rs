//! Path management for simple-audit
//!
//! Provides XDG-compliant path resolution for settings, the audit log and
//! exports.
//!
//! ## Path Resolution Order
//!
//! 1. `SIMPLE_AUDIT_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/simple-audit` or `~/.config/simple-audit`
//! 3. Windows: `%APPDATA%\simple-audit`

use std::path::PathBuf;

use crate::error::AuditError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "SIMPLE_AUDIT_DATA_DIR";

/// Manages all paths used by simple-audit
#[derive(Debug, Clone)]
pub struct AuditPaths {
    /// Base directory for all simple-audit data
    base_dir: PathBuf,
}

impl AuditPaths {
    /// Resolve the base directory
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, AuditError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create AuditPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/simple-audit/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the default export directory
    pub fn export_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Ensure the base and export directories exist
    pub fn ensure_directories(&self) -> Result<(), AuditError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| AuditError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.export_dir())
            .map_err(|e| AuditError::Io(format!("Failed to create export directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, AuditError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        Err(_) => {
            let home = std::env::var("HOME")
                .map_err(|_| AuditError::Config("HOME environment variable not set".into()))?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("simple-audit"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, AuditError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| AuditError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("simple-audit"))
}
