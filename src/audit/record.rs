//! Audit record data structures
//!
//! Defines the action kinds, the polymorphic owner reference and the audit
//! record itself, as written to and read back from an audit store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{AuditError, AuditResult};

use super::delta::{delta, Delta};

/// Field name to recorded value, as captured for one entity at one point in time
pub type ChangeLog = Map<String, Value>;

/// Kinds of actions that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Entity was created
    Create,
    /// Entity was updated
    Update,
    /// Entity was destroyed
    Destroy,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "destroy" | "delete" => Ok(Action::Destroy),
            other => Err(AuditError::Config(format!("Unknown audit action: {}", other))),
        }
    }
}

/// Polymorphic reference to the entity that owns an audit trail
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub auditable_type: String,
    pub auditable_id: String,
}

impl EntityRef {
    pub fn new(auditable_type: impl Into<String>, auditable_id: impl Into<String>) -> Self {
        Self {
            auditable_type: auditable_type.into(),
            auditable_id: auditable_id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.auditable_type, self.auditable_id)
    }
}

/// An audit record that has been built but not yet stored
///
/// The store assigns the identifier when it accepts the insert.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    pub owner: EntityRef,
    pub action: Action,
    pub change_log: ChangeLog,
    pub username: Option<String>,
    pub change_set: Uuid,
    pub created_at: DateTime<Utc>,
}

impl NewAuditRecord {
    pub fn new(
        owner: EntityRef,
        action: Action,
        change_log: ChangeLog,
        username: Option<String>,
        change_set: Uuid,
    ) -> Self {
        Self {
            owner,
            action,
            change_log,
            username,
            change_set,
            created_at: Utc::now(),
        }
    }

    /// Attach the store-assigned identifier
    pub fn into_record(self, id: u64) -> AuditRecord {
        AuditRecord {
            id,
            auditable_type: self.owner.auditable_type,
            auditable_id: self.owner.auditable_id,
            action: self.action,
            change_log: Value::Object(self.change_log),
            username: self.username,
            change_set: self.change_set,
            created_at: self.created_at,
        }
    }
}

/// One row per audited action
///
/// `change_log` holds the full snapshot of the audited fields at the time of
/// the action, never a diff. Differences are computed on demand with
/// [`AuditRecord::delta`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Monotonic identifier in creation order
    pub id: u64,

    /// Type of the owning entity
    pub auditable_type: String,

    /// Identifier of the owning entity
    pub auditable_id: String,

    /// Kind of action recorded
    pub action: Action,

    /// Snapshot of the audited fields
    pub change_log: Value,

    /// Display name of the acting user, if one could be resolved
    #[serde(default)]
    pub username: Option<String>,

    /// Shared by every record written for the same save
    pub change_set: Uuid,

    /// When the record was created (UTC)
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Reference to the owning entity
    pub fn owner(&self) -> EntityRef {
        EntityRef::new(&self.auditable_type, &self.auditable_id)
    }

    pub fn is_owned_by(&self, owner: &EntityRef) -> bool {
        self.auditable_type == owner.auditable_type && self.auditable_id == owner.auditable_id
    }

    /// The recorded field mapping
    ///
    /// Fails when the stored change log is not a mapping, which can only
    /// happen for records edited or produced outside this crate.
    pub fn change_log(&self) -> AuditResult<&ChangeLog> {
        self.change_log
            .as_object()
            .ok_or_else(|| AuditError::MalformedChangeLog {
                record_id: self.id,
                reason: format!("expected a mapping, found {}", value_kind(&self.change_log)),
            })
    }

    /// Sorted field names present in the change log
    pub fn fields(&self) -> AuditResult<Vec<String>> {
        let mut fields: Vec<String> = self.change_log()?.keys().cloned().collect();
        fields.sort();
        Ok(fields)
    }

    /// Fields that differ between `older` and this record
    ///
    /// Each change is `[value in older, value in self]`.
    pub fn delta(&self, older: &AuditRecord) -> AuditResult<Delta> {
        delta(older, self)
    }

    /// Format the record for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "#{} [{}] {} {}#{}",
            self.id,
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action.as_str().to_uppercase(),
            self.auditable_type,
            self.auditable_id
        );

        if let Some(username) = &self.username {
            output.push_str(&format!(" by {}", username));
        }

        output
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
