//! CSV Export functionality
//!
//! Exports audit records to CSV, one row per record, with the change log
//! kept as a JSON column.

use std::io::Write;

use crate::audit::AuditRecord;
use crate::error::{AuditError, AuditResult};

const HEADER: [&str; 8] = [
    "ID",
    "Created At",
    "Type",
    "Entity ID",
    "Action",
    "Username",
    "Change Set",
    "Change Log",
];

/// Export records to CSV
pub fn export_trail_csv<W: Write>(records: &[AuditRecord], writer: W) -> AuditResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(HEADER)
        .map_err(|e| AuditError::Export(e.to_string()))?;

    for record in records {
        let change_log = serde_json::to_string(&record.change_log)
            .map_err(|e| AuditError::Export(e.to_string()))?;

        csv_writer
            .write_record([
                record.id.to_string(),
                record.created_at.to_rfc3339(),
                record.auditable_type.clone(),
                record.auditable_id.clone(),
                record.action.to_string(),
                record.username.clone().unwrap_or_default(),
                record.change_set.to_string(),
                change_log,
            ])
            .map_err(|e| AuditError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| AuditError::Export(e.to_string()))?;

    Ok(())
}
