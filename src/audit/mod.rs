//! Change auditing for persisted entities
//!
//! Records create, update and destroy actions as immutable audit records,
//! each holding a full snapshot of the entity's audited fields with embedded
//! associations folded in as nested maps.
//!
//! # Architecture
//!
//! - `detector`: the [`Auditable`] introspection trait and [`snapshot`], which
//!   turns a live entity into plain data.
//! - `policy`: [`AuditPolicy`], the per-entity-type configuration (fields,
//!   guard, actor naming, trigger, cascade).
//! - `actor`: [`Actor`] and [`resolve_username`].
//! - `auditor`: [`Auditor`], called at the save/destroy boundary to build and
//!   store records.
//! - `store`: the [`AuditStore`] trait with in-memory and JSONL backends.
//! - `delta`: on-demand comparison of two records.
//!
//! # Example
//!
//! ```rust,ignore
//! use simple_audit::audit::{AuditPolicy, Auditor, JsonlAuditStore, NameStrategy};
//!
//! let auditor = Auditor::new(JsonlAuditStore::open(paths.audit_log())?);
//! let policy = AuditPolicy::new()
//!     .with_fields(["name", "address"])
//!     .with_name_strategy(NameStrategy::Short);
//!
//! repository.save(&person)?;
//! auditor.updated(&person, &policy, Some(&current_user))?;
//!
//! let trail = auditor.trail(&person)?;
//! let changes = trail[1].delta(&trail[0])?;
//! ```

mod actor;
mod auditor;
mod delta;
mod detector;
mod policy;
mod record;
mod store;

pub use actor::{resolve_username, Actor, ActorKind, NameStrategy};
pub use auditor::{AuditOutcome, Auditor};
pub use delta::{
    delta, detailed_lines, diff_change_logs, summarize, summary_lines, Delta, FieldChange,
};
pub use detector::{attributes_of, changed_fields, snapshot, Association, Auditable};
pub use policy::{AuditPolicy, AuditTrigger, CascadeMode, Guard};
pub use record::{Action, AuditRecord, ChangeLog, EntityRef, NewAuditRecord};
pub use store::{AuditStore, JsonlAuditStore, MemoryAuditStore};
