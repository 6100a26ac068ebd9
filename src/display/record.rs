//! Audit record display formatting
//!
//! Formats audit trails and single records for terminal output.

use crate::audit::AuditRecord;

/// Format a list of audit records as a table
pub fn format_record_list(records: &[AuditRecord], timestamp_format: &str) -> String {
    if records.is_empty() {
        return "No audit records found.".to_string();
    }

    let owner_width = records
        .iter()
        .map(|r| r.owner().to_string().len())
        .max()
        .unwrap_or(6)
        .max(6);

    let user_width = records
        .iter()
        .map(|r| r.username.as_deref().map_or(1, str::len))
        .max()
        .unwrap_or(8)
        .max(8);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>6}  {:<19}  {:<7}  {:<owner_width$}  {:<user_width$}  {}\n",
        "ID",
        "Created",
        "Action",
        "Entity",
        "Username",
        "Fields",
        owner_width = owner_width,
        user_width = user_width,
    ));

    output.push_str(&format!(
        "{:->6}  {:-<19}  {:-<7}  {:-<owner_width$}  {:-<user_width$}  {:-<6}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        owner_width = owner_width,
        user_width = user_width,
    ));

    for record in records {
        let fields = record
            .fields()
            .map(|f| f.join(", "))
            .unwrap_or_else(|_| "(malformed)".to_string());

        output.push_str(&format!(
            "{:>6}  {:<19}  {:<7}  {:<owner_width$}  {:<user_width$}  {}\n",
            record.id,
            record.created_at.format(timestamp_format).to_string(),
            record.action.to_string(),
            record.owner().to_string(),
            record.username.as_deref().unwrap_or("-"),
            fields,
            owner_width = owner_width,
            user_width = user_width,
        ));
    }

    output.push_str(&format!("\nTotal: {} records", records.len()));
    output
}

/// Format a single record with its full change log
pub fn format_record_details(record: &AuditRecord, timestamp_format: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Audit record #{}\n", record.id));
    output.push_str(&format!("  Entity:     {}\n", record.owner()));
    output.push_str(&format!("  Action:     {}\n", record.action));
    output.push_str(&format!(
        "  Username:   {}\n",
        record.username.as_deref().unwrap_or("(none)")
    ));
    output.push_str(&format!(
        "  Created:    {}\n",
        record.created_at.format(timestamp_format)
    ));
    output.push_str(&format!("  Change set: {}\n", record.change_set));
    output.push_str("  Change log:\n");

    let change_log = serde_json::to_string_pretty(&record.change_log)
        .unwrap_or_else(|_| record.change_log.to_string());
    for line in change_log.lines() {
        output.push_str(&format!("    {}\n", line));
    }

    output
}
