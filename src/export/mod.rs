//! Export module for simple-audit
//!
//! Writes audit trails out in several formats:
//! - CSV: one row per record, spreadsheet-compatible
//! - JSON: machine-readable, with schema version and metadata
//! - YAML: human-readable version of the JSON export

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_trail_csv;
pub use json::{export_trail_json, import_from_json, ExportMetadata, TrailExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_trail_yaml, import_from_yaml};
