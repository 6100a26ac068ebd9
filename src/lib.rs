//! simple-audit - change auditing for persisted entities
//!
//! This library records every create, update and destroy of an auditable
//! entity as an immutable audit record. Each record holds a full snapshot of
//! the entity's audited fields (with embedded associations folded in as nested
//! maps), the action, an optional actor name and a timestamp. Deltas between
//! any two records are computed on demand.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `audit`: the auditing core (detector, policy, actor resolution, records,
//!   stores, delta engine)
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `display`: Terminal formatting of trails and deltas
//! - `export`: CSV, JSON and YAML export of audit records
//! - `cli`: Command handlers for the `simple-audit` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use simple_audit::audit::{AuditPolicy, Auditor, JsonlAuditStore};
//! use simple_audit::config::{AuditPaths, Settings};
//!
//! let paths = AuditPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let auditor = Auditor::new(JsonlAuditStore::open(paths.audit_log())?);
//! let policy = AuditPolicy::from_settings(&settings).with_fields(["name"]);
//! auditor.created(&person, &policy, None)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;

pub use error::{AuditError, AuditResult};
