//! Configuration module for simple-audit
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Settings persistence
//! - Default audit policy options

pub mod paths;
pub mod settings;

pub use paths::AuditPaths;
pub use settings::Settings;
