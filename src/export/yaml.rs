//! YAML Export functionality
//!
//! Exports audit records to YAML for human reading.

use std::io::Write;

use crate::audit::AuditRecord;
use crate::error::{AuditError, AuditResult};
use crate::export::json::TrailExport;

/// Export records to YAML format
pub fn export_trail_yaml<W: Write>(records: Vec<AuditRecord>, writer: &mut W) -> AuditResult<()> {
    let export = TrailExport::from_records(records);

    writeln!(writer, "# simple-audit trail export")
        .map_err(|e| AuditError::Export(e.to_string()))?;
    writeln!(writer, "# Generated: {}", export.exported_at)
        .map_err(|e| AuditError::Export(e.to_string()))?;
    writeln!(writer, "# App Version: {}", export.app_version)
        .map_err(|e| AuditError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| AuditError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| AuditError::Export(e.to_string()))?;

    Ok(())
}

/// Read a YAML export back
pub fn import_from_yaml(yaml_str: &str) -> AuditResult<TrailExport> {
    let export: TrailExport =
        serde_yaml::from_str(yaml_str).map_err(|e| AuditError::Export(e.to_string()))?;

    export.validate().map_err(AuditError::Export)?;

    Ok(export)
}
