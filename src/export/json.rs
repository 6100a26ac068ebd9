//! JSON Export functionality
//!
//! Exports audit records to JSON format with schema versioning.

use std::collections::BTreeSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{Action, AuditRecord};
use crate::error::{AuditError, AuditResult};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Audit trail export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// Exported records, oldest first
    pub records: Vec<AuditRecord>,

    /// Export metadata
    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub record_count: usize,

    /// Distinct owning entities
    pub entity_count: usize,

    pub create_count: usize,
    pub update_count: usize,
    pub destroy_count: usize,

    /// Oldest record timestamp
    pub earliest_record: Option<DateTime<Utc>>,

    /// Newest record timestamp
    pub latest_record: Option<DateTime<Utc>>,
}

impl ExportMetadata {
    /// Summarize a set of records
    pub fn from_records(records: &[AuditRecord]) -> Self {
        let entities: BTreeSet<_> = records.iter().map(AuditRecord::owner).collect();
        let count = |action: Action| records.iter().filter(|r| r.action == action).count();

        Self {
            record_count: records.len(),
            entity_count: entities.len(),
            create_count: count(Action::Create),
            update_count: count(Action::Update),
            destroy_count: count(Action::Destroy),
            earliest_record: records.iter().map(|r| r.created_at).min(),
            latest_record: records.iter().map(|r| r.created_at).max(),
        }
    }
}

impl TrailExport {
    /// Create a new export from records
    pub fn from_records(mut records: Vec<AuditRecord>) -> Self {
        records.sort_by_key(|r| r.id);
        let metadata = ExportMetadata::from_records(&records);

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            records,
            metadata,
        }
    }

    /// Validate an export read back from disk
    pub fn validate(&self) -> Result<(), String> {
        let major = self.schema_version.split('.').next().unwrap_or("");
        if major != "1" {
            return Err(format!(
                "Unsupported schema version: {}",
                self.schema_version
            ));
        }

        if self.metadata.record_count != self.records.len() {
            return Err(format!(
                "Record count mismatch: metadata says {}, found {}",
                self.metadata.record_count,
                self.records.len()
            ));
        }

        if let Some(record) = self.records.iter().find(|r| !r.change_log.is_object()) {
            return Err(format!("Record {} has a malformed change log", record.id));
        }

        Ok(())
    }
}

/// Export records to JSON format
pub fn export_trail_json<W: Write>(
    records: Vec<AuditRecord>,
    writer: &mut W,
    pretty: bool,
) -> AuditResult<()> {
    let export = TrailExport::from_records(records);

    if pretty {
        serde_json::to_writer_pretty(&mut *writer, &export)
    } else {
        serde_json::to_writer(&mut *writer, &export)
    }
    .map_err(|e| AuditError::Export(e.to_string()))?;

    writeln!(writer).map_err(|e| AuditError::Export(e.to_string()))?;
    Ok(())
}

/// Read a JSON export back
pub fn import_from_json(json_str: &str) -> AuditResult<TrailExport> {
    let export: TrailExport =
        serde_json::from_str(json_str).map_err(|e| AuditError::Export(e.to_string()))?;

    export.validate().map_err(AuditError::Export)?;

    Ok(export)
}
