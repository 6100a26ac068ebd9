//! Delta display formatting

use crate::audit::{detailed_lines, summary_lines, AuditRecord, Delta};

/// Format the delta between two records
///
/// With `detailed` set, nested maps are expanded one line per changed key.
pub fn format_delta(
    older: &AuditRecord,
    newer: &AuditRecord,
    delta: &Delta,
    detailed: bool,
) -> String {
    let mut output = format!(
        "Changes from #{} ({}) to #{} ({})\n",
        older.id, older.action, newer.id, newer.action
    );

    if delta.is_empty() {
        output.push_str("  (no audited field changed)\n");
        return output;
    }

    let lines = if detailed {
        detailed_lines(delta)
    } else {
        summary_lines(delta)
    };

    for line in lines {
        output.push_str(&format!("  {}\n", line));
    }

    output
}
