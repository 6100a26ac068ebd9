//! Delta engine
//!
//! Compares the change logs of two audit records and reports the fields whose
//! values differ. Comparison is one level deep: a nested association map that
//! differs anywhere is reported whole, old map against new map.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AuditResult;

use super::record::{AuditRecord, ChangeLog};

/// A single changed field, serialized as `[old, new]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Value, Value)", into = "(Value, Value)")]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

impl FieldChange {
    pub fn new(old: Value, new: Value) -> Self {
        Self { old, new }
    }

    /// Swap the two sides
    pub fn reversed(&self) -> Self {
        Self::new(self.new.clone(), self.old.clone())
    }
}

impl From<(Value, Value)> for FieldChange {
    fn from((old, new): (Value, Value)) -> Self {
        Self { old, new }
    }
}

impl From<FieldChange> for (Value, Value) {
    fn from(change: FieldChange) -> Self {
        (change.old, change.new)
    }
}

/// Field name to changed pair, ordered by field name
pub type Delta = BTreeMap<String, FieldChange>;

/// Compute the fields that differ between two records
///
/// Pairs are always `[value in older, value in newer]`; no temporal order is
/// inferred from the records themselves. Fails if either change log is not a
/// mapping rather than returning a partial result.
pub fn delta(older: &AuditRecord, newer: &AuditRecord) -> AuditResult<Delta> {
    let before = older.change_log()?;
    let after = newer.change_log()?;
    Ok(diff_change_logs(before, after))
}

/// Compare two change logs field by field
///
/// A field missing from one side compares as `null`.
pub fn diff_change_logs(before: &ChangeLog, after: &ChangeLog) -> Delta {
    let fields: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    fields
        .into_iter()
        .filter_map(|field| {
            let old = before.get(field).unwrap_or(&Value::Null);
            let new = after.get(field).unwrap_or(&Value::Null);
            (old != new).then(|| (field.clone(), FieldChange::new(old.clone(), new.clone())))
        })
        .collect()
}

/// One `field: old -> new` line per changed field
pub fn summary_lines(delta: &Delta) -> Vec<String> {
    delta
        .iter()
        .map(|(field, change)| {
            format!(
                "{}: {} -> {}",
                field,
                format_value(&change.old),
                format_value(&change.new)
            )
        })
        .collect()
}

/// Generate a one-line summary of a delta
///
/// Returns `None` when nothing changed.
pub fn summarize(delta: &Delta) -> Option<String> {
    if delta.is_empty() {
        None
    } else {
        Some(summary_lines(delta).join(", "))
    }
}

/// Expand a delta into one line per changed leaf
///
/// Nested maps are walked so `address.zip: "550350" -> "550150"` is shown
/// instead of the whole map. Presentation only; the delta itself stays one
/// level deep.
pub fn detailed_lines(delta: &Delta) -> Vec<String> {
    let mut lines = Vec::new();
    for (field, change) in delta {
        describe_change(&change.old, &change.new, field, &mut lines);
    }
    lines
}

fn describe_change(before: &Value, after: &Value, prefix: &str, lines: &mut Vec<String>) {
    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let keys: BTreeSet<&String> = before_obj.keys().chain(after_obj.keys()).collect();
            for key in keys {
                let path = format!("{}.{}", prefix, key);
                match (before_obj.get(key), after_obj.get(key)) {
                    (Some(b), Some(a)) if b != a => describe_change(b, a, &path, lines),
                    (Some(_), Some(_)) => {}
                    (Some(b), None) => {
                        lines.push(format!("{}: {} -> (removed)", path, format_value(b)))
                    }
                    (None, Some(a)) => {
                        lines.push(format!("{}: (added) -> {}", path, format_value(a)))
                    }
                    (None, None) => {}
                }
            }
        }
        _ => {
            if before != after {
                lines.push(format!(
                    "{}: {} -> {}",
                    prefix,
                    format_value(before),
                    format_value(after)
                ));
            }
        }
    }
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > 50 {
                let truncated: String = s.chars().take(47).collect();
                format!("\"{}...\"", truncated)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
