//! Change detection for auditable entities
//!
//! Turns a live entity into a plain change log: declared fields only, with
//! associated entities replaced by their own nested change logs so the result
//! stays valid after the entity is mutated again.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AuditError, AuditResult};

use super::delta::diff_change_logs;
use super::record::{value_kind, ChangeLog, EntityRef};

/// Associations deeper than this are treated as a cycle
const MAX_NESTING: usize = 16;

/// State of a declared association on a live entity
#[derive(Clone, Copy)]
pub enum Association<'a> {
    /// An associated entity is attached
    Attached(&'a dyn Auditable),
    /// The association is declared but currently empty
    Absent,
}

impl<'a> Association<'a> {
    /// Build from an optional associated entity
    pub fn from_option<T: Auditable + 'a>(entity: Option<&'a T>) -> Self {
        match entity {
            Some(entity) => Association::Attached(entity),
            None => Association::Absent,
        }
    }

    pub fn entity(&self) -> Option<&'a dyn Auditable> {
        match self {
            Association::Attached(entity) => Some(*entity),
            Association::Absent => None,
        }
    }
}

/// A persisted entity whose changes can be audited
///
/// This is the introspection surface the persistence layer provides: the
/// entity's identity, its persisted attributes and its declared associations.
pub trait Auditable {
    /// Type name stored as `auditable_type`
    fn auditable_type(&self) -> &str;

    /// Identifier stored as `auditable_id`
    fn auditable_id(&self) -> String;

    /// Persisted attributes as plain data
    ///
    /// Usually implemented with [`attributes_of`].
    fn attributes(&self) -> AuditResult<ChangeLog>;

    /// Fields this type audits when no policy overrides them
    ///
    /// `None` audits every persisted attribute. Also used when this entity is
    /// embedded into an owner's change log.
    fn audited_fields(&self) -> Option<&[&str]> {
        None
    }

    /// Look up a declared association by field name
    ///
    /// Returns `None` when `name` is not an association.
    fn association(&self, _name: &str) -> Option<Association<'_>> {
        None
    }

    /// Reference used as the owner of this entity's audit records
    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.auditable_type(), self.auditable_id())
    }
}

/// Serialize an entity into its attribute map
pub fn attributes_of<T: Serialize + ?Sized>(entity: &T) -> AuditResult<ChangeLog> {
    let value = serde_json::to_value(entity)
        .map_err(|e| AuditError::Serialization(format!("Failed to serialize attributes: {}", e)))?;

    // serde_json turns NaN and infinities into null; only nulls need a second look
    if contains_null(&value) {
        reject_non_finite(entity)?;
    }

    match value {
        Value::Object(attributes) => Ok(attributes),
        other => Err(AuditError::Serialization(format!(
            "Attributes must serialize to a mapping, found {}",
            value_kind(&other)
        ))),
    }
}

fn contains_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().any(contains_null),
        Value::Object(map) => map.values().any(contains_null),
        _ => false,
    }
}

/// Fail on NaN or infinite floats, which have no JSON representation
fn reject_non_finite<T: Serialize + ?Sized>(entity: &T) -> AuditResult<()> {
    let value = serde_yaml::to_value(entity)
        .map_err(|e| AuditError::Serialization(format!("Failed to serialize attributes: {}", e)))?;

    match non_finite_path(&value, "") {
        Some(path) => Err(AuditError::Serialization(format!(
            "Attribute {} is not a finite number",
            path
        ))),
        None => Ok(()),
    }
}

fn non_finite_path(value: &serde_yaml::Value, path: &str) -> Option<String> {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Number(n) if n.is_nan() || n.is_infinite() => Some(path.to_string()),
        Yaml::Sequence(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, item)| non_finite_path(item, &format!("{}[{}]", path, i))),
        Yaml::Mapping(map) => map.iter().find_map(|(key, item)| {
            let key = key.as_str().map_or_else(|| format!("{:?}", key), str::to_string);
            let nested = if path.is_empty() {
                key
            } else {
                format!("{}.{}", path, key)
            };
            non_finite_path(item, &nested)
        }),
        Yaml::Tagged(tagged) => non_finite_path(&tagged.value, path),
        _ => None,
    }
}

/// Capture the current state of an entity
///
/// `fields` overrides the entity's own declaration; when both are absent
/// every persisted attribute is captured. Declared associations become nested
/// maps built from the associated entity's own audited fields, and an absent
/// association becomes an empty map so the key is always present.
pub fn snapshot(entity: &dyn Auditable, fields: Option<&[String]>) -> AuditResult<ChangeLog> {
    let declared = match fields {
        Some(fields) => Some(fields.to_vec()),
        None => declared_fields(entity),
    };
    capture(entity, declared, 0)
}

/// Top-level fields whose values differ between two change logs
pub fn changed_fields(previous: &ChangeLog, current: &ChangeLog) -> Vec<String> {
    diff_change_logs(previous, current).into_keys().collect()
}

fn declared_fields(entity: &dyn Auditable) -> Option<Vec<String>> {
    entity
        .audited_fields()
        .map(|fields| fields.iter().map(|f| f.to_string()).collect())
}

fn capture(
    entity: &dyn Auditable,
    declared: Option<Vec<String>>,
    depth: usize,
) -> AuditResult<ChangeLog> {
    if depth > MAX_NESTING {
        return Err(AuditError::Serialization(format!(
            "Association nesting under {} exceeds {} levels",
            entity.auditable_type(),
            MAX_NESTING
        )));
    }

    let attributes = entity.attributes()?;
    let fields = declared.unwrap_or_else(|| attributes.keys().cloned().collect());

    let mut change_log = ChangeLog::new();
    for field in fields {
        let value = match entity.association(&field) {
            Some(Association::Attached(associated)) => Value::Object(capture(
                associated,
                declared_fields(associated),
                depth + 1,
            )?),
            Some(Association::Absent) => Value::Object(Map::new()),
            None => match attributes.get(&field) {
                Some(value) => value.clone(),
                None => {
                    return Err(AuditError::UnknownField {
                        auditable_type: entity.auditable_type().to_string(),
                        field,
                    })
                }
            },
        };
        change_log.insert(field, value);
    }

    Ok(change_log)
}
