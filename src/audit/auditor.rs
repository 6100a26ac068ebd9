//! Audit record builder
//!
//! The persistence layer calls the auditor right after an entity has been
//! saved or destroyed. The auditor consults the entity type's policy, captures
//! the audited state and writes one record, plus one record per tracked
//! association when the policy cascades.
//!
//! A failed audit write is returned to the caller once. It never undoes the
//! entity save that triggered it.

use uuid::Uuid;

use crate::error::AuditResult;

use super::actor::{resolve_username, Actor};
use super::detector::{changed_fields, snapshot, Association, Auditable};
use super::policy::{AuditPolicy, AuditTrigger, CascadeMode};
use super::record::{Action, AuditRecord, ChangeLog, EntityRef, NewAuditRecord};
use super::store::AuditStore;

/// What happened when a save was audited
#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    /// A record was written for the entity, plus any cascaded association records
    Recorded {
        record: AuditRecord,
        cascaded: Vec<AuditRecord>,
    },
    /// The policy guard vetoed this save
    Suppressed,
    /// No audited field changed since the last record
    Unchanged,
}

impl AuditOutcome {
    /// The entity's own record, if one was written
    pub fn record(&self) -> Option<&AuditRecord> {
        match self {
            AuditOutcome::Recorded { record, .. } => Some(record),
            _ => None,
        }
    }

    pub fn is_recorded(&self) -> bool {
        matches!(self, AuditOutcome::Recorded { .. })
    }

    /// Total number of records written
    pub fn records_written(&self) -> usize {
        match self {
            AuditOutcome::Recorded { cascaded, .. } => 1 + cascaded.len(),
            _ => 0,
        }
    }
}

/// Builds and stores audit records
pub struct Auditor<S: AuditStore> {
    store: S,
}

impl<S: AuditStore> Auditor<S> {
    /// Create an auditor writing to `store`
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Audit a completed save or destroy
    ///
    /// `actor` is whoever performed the action, as known to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity's state cannot be captured or the store
    /// rejects the write. A guard veto or an unchanged entity is not an error.
    pub fn audit<E: Auditable>(
        &self,
        entity: &E,
        action: Action,
        policy: &AuditPolicy<E>,
        actor: Option<&dyn Actor>,
    ) -> AuditResult<AuditOutcome> {
        let owner = entity.entity_ref();

        if !policy.allows(entity, action) {
            tracing::debug!(auditable = %owner, %action, "Audit suppressed by guard");
            return Ok(AuditOutcome::Suppressed);
        }

        let change_log = snapshot(entity, policy.fields())?;

        if action == Action::Update && policy.trigger() == AuditTrigger::AuditedChange {
            if let Some(previous) = self.store.last_for(&owner)? {
                if changed_fields(previous.change_log()?, &change_log).is_empty() {
                    tracing::debug!(auditable = %owner, "No audited field changed");
                    return Ok(AuditOutcome::Unchanged);
                }
            }
        }

        let username = resolve_username(actor, policy.name_strategy());
        let change_set = Uuid::new_v4();

        let record = self.write(NewAuditRecord::new(
            owner,
            action,
            change_log,
            username.clone(),
            change_set,
        ))?;

        let cascaded = if policy.cascade() == CascadeMode::EmbedAndTrack && action != Action::Destroy
        {
            self.track_associations(entity, &record, username, change_set)?
        } else {
            Vec::new()
        };

        Ok(AuditOutcome::Recorded { record, cascaded })
    }

    /// Audit a freshly created entity
    pub fn created<E: Auditable>(
        &self,
        entity: &E,
        policy: &AuditPolicy<E>,
        actor: Option<&dyn Actor>,
    ) -> AuditResult<AuditOutcome> {
        self.audit(entity, Action::Create, policy, actor)
    }

    /// Audit an updated entity
    pub fn updated<E: Auditable>(
        &self,
        entity: &E,
        policy: &AuditPolicy<E>,
        actor: Option<&dyn Actor>,
    ) -> AuditResult<AuditOutcome> {
        self.audit(entity, Action::Update, policy, actor)
    }

    /// Audit a destroyed entity, capturing its last state
    pub fn destroyed<E: Auditable>(
        &self,
        entity: &E,
        policy: &AuditPolicy<E>,
        actor: Option<&dyn Actor>,
    ) -> AuditResult<AuditOutcome> {
        self.audit(entity, Action::Destroy, policy, actor)
    }

    /// Records owned by an entity, oldest first
    pub fn trail(&self, entity: &dyn Auditable) -> AuditResult<Vec<AuditRecord>> {
        self.store.for_entity(&entity.entity_ref())
    }

    /// Records owned by the entity with this type and id, oldest first
    pub fn trail_for(
        &self,
        auditable_type: &str,
        auditable_id: &str,
    ) -> AuditResult<Vec<AuditRecord>> {
        self.store
            .for_entity(&EntityRef::new(auditable_type, auditable_id))
    }

    /// Most recent record owned by an entity
    pub fn last_for(&self, entity: &dyn Auditable) -> AuditResult<Option<AuditRecord>> {
        self.store.last_for(&entity.entity_ref())
    }

    /// Record each attached association that is new or changed since its
    /// last record, under the association's own identity
    fn track_associations(
        &self,
        entity: &dyn Auditable,
        owner_record: &AuditRecord,
        username: Option<String>,
        change_set: Uuid,
    ) -> AuditResult<Vec<AuditRecord>> {
        let mut cascaded = Vec::new();

        for field in owner_record.fields()? {
            let Some(Association::Attached(associated)) = entity.association(&field) else {
                continue;
            };

            let associated_ref = associated.entity_ref();
            let change_log = snapshot(associated, None)?;

            let action = match self.store.last_for(&associated_ref)? {
                None => Action::Create,
                Some(previous) if differs(previous.change_log()?, &change_log) => Action::Update,
                Some(_) => continue,
            };

            tracing::debug!(
                owner = %owner_record.owner(),
                association = %associated_ref,
                %action,
                "Cascading audit to association"
            );

            cascaded.push(self.write(NewAuditRecord::new(
                associated_ref,
                action,
                change_log,
                username.clone(),
                change_set,
            ))?);
        }

        Ok(cascaded)
    }

    fn write(&self, record: NewAuditRecord) -> AuditResult<AuditRecord> {
        let owner = record.owner.clone();
        let action = record.action;

        match self.store.insert(record) {
            Ok(record) => {
                tracing::info!(
                    record_id = record.id,
                    auditable = %owner,
                    %action,
                    username = record.username.as_deref().unwrap_or("-"),
                    "Audit record created"
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(auditable = %owner, %action, error = %e, "Failed to write audit record");
                Err(e)
            }
        }
    }
}

fn differs(previous: &ChangeLog, current: &ChangeLog) -> bool {
    !changed_fields(previous, current).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::actor::ActorKind;
    use crate::audit::detector::attributes_of;
    use crate::audit::store::MemoryAuditStore;
    use crate::error::AuditError;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Clone, Serialize)]
    struct Address {
        id: u32,
        line_1: String,
    }

    impl Auditable for Address {
        fn auditable_type(&self) -> &str {
            "Address"
        }

        fn auditable_id(&self) -> String {
            self.id.to_string()
        }

        fn attributes(&self) -> AuditResult<ChangeLog> {
            attributes_of(self)
        }
    }

    #[derive(Clone, Serialize)]
    struct Person {
        id: u32,
        name: String,
        email: String,
        #[serde(skip)]
        address: Option<Address>,
    }

    impl Auditable for Person {
        fn auditable_type(&self) -> &str {
            "Person"
        }

        fn auditable_id(&self) -> String {
            self.id.to_string()
        }

        fn attributes(&self) -> AuditResult<ChangeLog> {
            attributes_of(self)
        }

        fn association(&self, name: &str) -> Option<Association<'_>> {
            (name == "address").then(|| Association::from_option(self.address.as_ref()))
        }
    }

    struct BrokenStore;

    impl AuditStore for BrokenStore {
        fn insert(&self, _record: NewAuditRecord) -> AuditResult<AuditRecord> {
            Err(AuditError::Storage("disk full".into()))
        }

        fn all(&self) -> AuditResult<Vec<AuditRecord>> {
            Ok(Vec::new())
        }
    }

    fn person() -> Person {
        Person {
            id: 1,
            name: "Mihai Tarnovan".into(),
            email: "mihai.tarnovan@cubus.ro".into(),
            address: Some(Address {
                id: 10,
                line_1: "M. Viteazu nr. 11".into(),
            }),
        }
    }

    fn policy() -> AuditPolicy<Person> {
        AuditPolicy::new().with_fields(["name", "address"])
    }

    #[test]
    fn test_create_record() {
        let auditor = Auditor::new(MemoryAuditStore::new());
        let actor = ActorKind::FullName("Gigi Kent".into());

        let outcome = auditor.created(&person(), &policy(), Some(&actor)).unwrap();
        let record = outcome.record().unwrap();

        assert_eq!(record.action, Action::Create);
        assert_eq!(record.owner(), EntityRef::new("Person", "1"));
        assert_eq!(record.username.as_deref(), Some("Gigi Kent"));
        assert_eq!(
            record.change_log,
            json!({"name": "Mihai Tarnovan", "address": {"id": 10, "line_1": "M. Viteazu nr. 11"}})
        );
        assert_eq!(outcome.records_written(), 1);
    }

    #[test]
    fn test_guard_suppresses() {
        let auditor = Auditor::new(MemoryAuditStore::new());
        let policy = policy().with_guard(|_, action| action != Action::Update);

        assert!(auditor.created(&person(), &policy, None).unwrap().is_recorded());
        assert_eq!(
            auditor.updated(&person(), &policy, None).unwrap(),
            AuditOutcome::Suppressed
        );
        assert_eq!(auditor.store().count().unwrap(), 1);
    }

    #[test]
    fn test_always_trigger_records_unchanged_update() {
        let auditor = Auditor::new(MemoryAuditStore::new());
        let mut p = person();

        auditor.created(&p, &policy(), None).unwrap();
        p.email = "mihai.tarnovan@gmail.com".into();
        let outcome = auditor.updated(&p, &policy(), None).unwrap();

        assert!(outcome.is_recorded());
        let trail = auditor.trail(&p).unwrap();
        assert!(trail[1].delta(&trail[0]).unwrap().is_empty());
    }

    #[test]
    fn test_audited_change_trigger_skips_unchanged_update() {
        let auditor = Auditor::new(MemoryAuditStore::new());
        let policy = policy().with_trigger(AuditTrigger::AuditedChange);
        let mut p = person();

        auditor.created(&p, &policy, None).unwrap();
        p.email = "mihai.tarnovan@gmail.com".into();
        assert_eq!(auditor.updated(&p, &policy, None).unwrap(), AuditOutcome::Unchanged);

        p.name = "Mihai T.".into();
        assert!(auditor.updated(&p, &policy, None).unwrap().is_recorded());
        assert_eq!(auditor.trail(&p).unwrap().len(), 2);
    }

    #[test]
    fn test_destroy_captures_last_state() {
        let auditor = Auditor::new(MemoryAuditStore::new());
        let p = person();

        auditor.created(&p, &policy(), None).unwrap();
        let outcome = auditor.destroyed(&p, &policy(), None).unwrap();

        let record = outcome.record().unwrap();
        assert_eq!(record.action, Action::Destroy);
        assert_eq!(record.change_log["name"], json!("Mihai Tarnovan"));
        assert_eq!(auditor.last_for(&p).unwrap().unwrap().id, record.id);
    }

    #[test]
    fn test_cascade_tracks_new_and_changed_associations() {
        let auditor = Auditor::new(MemoryAuditStore::new());
        let policy = policy().with_cascade(CascadeMode::EmbedAndTrack);
        let mut p = person();

        let created = auditor.created(&p, &policy, None).unwrap();
        let AuditOutcome::Recorded { record, cascaded } = &created else {
            panic!("expected a record");
        };
        assert_eq!(cascaded.len(), 1);
        assert_eq!(cascaded[0].action, Action::Create);
        assert_eq!(cascaded[0].owner(), EntityRef::new("Address", "10"));
        assert_eq!(cascaded[0].change_set, record.change_set);

        // Unchanged association is not recorded again
        p.name = "Mihai T.".into();
        assert_eq!(auditor.updated(&p, &policy, None).unwrap().records_written(), 1);

        if let Some(address) = p.address.as_mut() {
            address.line_1 = "Calea Lunga nr. 104".into();
        }
        let outcome = auditor.updated(&p, &policy, None).unwrap();
        assert_eq!(outcome.records_written(), 2);

        let address_trail = auditor.trail_for("Address", "10").unwrap();
        assert_eq!(address_trail.len(), 2);
        assert_eq!(address_trail[1].action, Action::Update);
    }

    #[test]
    fn test_embed_only_never_writes_association_records() {
        let auditor = Auditor::new(MemoryAuditStore::new());
        auditor.created(&person(), &policy(), None).unwrap();
        assert!(auditor.trail_for("Address", "10").unwrap().is_empty());
    }

    #[test]
    fn test_write_failure_surfaces() {
        let auditor = Auditor::new(BrokenStore);
        let err = auditor.created(&person(), &policy(), None).unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_unknown_field_surfaces() {
        let auditor = Auditor::new(MemoryAuditStore::new());
        let policy: AuditPolicy<Person> = AuditPolicy::new().with_fields(["nickname"]);

        let err = auditor.created(&person(), &policy, None).unwrap_err();
        assert!(matches!(err, AuditError::UnknownField { .. }));
        assert_eq!(auditor.store().count().unwrap(), 0);
    }
}
