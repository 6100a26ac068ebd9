//! Shared fixtures for integration tests
//!
//! A small domain (people with an embedded address) plus a repository that
//! calls the auditor at its save boundary, the way an application would.

#![allow(dead_code)]

use std::cell::Cell;

use serde::Serialize;

use simple_audit::audit::{
    attributes_of, Action, Actor, Association, AuditOutcome, AuditPolicy, AuditStore, Auditable,
    Auditor, ChangeLog, MemoryAuditStore, NameStrategy,
};
use simple_audit::AuditResult;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Address {
    #[serde(skip)]
    pub id: u32,
    pub line_1: String,
    pub zip: String,
}

impl Address {
    pub fn new(line_1: &str, zip: &str) -> Self {
        Self {
            id: 0,
            line_1: line_1.into(),
            zip: zip.into(),
        }
    }
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

/// An address whose records carry the actor's short name
#[derive(Debug, Clone, Default)]
pub struct HomeAddress(pub Address);

impl Auditable for HomeAddress {
    fn auditable_type(&self) -> &str {
        "HomeAddress"
    }

    fn auditable_id(&self) -> String {
        self.0.auditable_id()
    }

    fn attributes(&self) -> AuditResult<ChangeLog> {
        self.0.attributes()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Person {
    #[serde(skip)]
    pub id: u32,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub address: Option<Address>,
}

impl Person {
    pub fn new(name: &str, email: &str, address: Address) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            address: Some(address),
        }
    }
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

/// A person whose policy only lets some saves through
#[derive(Debug, Clone, Default)]
pub struct SecretivePerson(pub Person);

impl Auditable for SecretivePerson {
    fn auditable_type(&self) -> &str {
        "SecretivePerson"
    }

    fn auditable_id(&self) -> String {
        self.0.auditable_id()
    }

    fn attributes(&self) -> AuditResult<ChangeLog> {
        self.0.attributes()
    }

    fn association(&self, name: &str) -> Option<Association<'_>> {
        self.0.association(name)
    }
}

/// The logged-in user, exposing both names
pub struct User;

impl Actor for User {
    fn short_name(&self) -> Option<String> {
        Some("mtarnovan".into())
    }

    fn full_name(&self) -> Option<String> {
        Some("Mihai Tarnovan".into())
    }
}

pub fn person_policy() -> AuditPolicy<Person> {
    AuditPolicy::new().with_fields(["name", "address"])
}

pub fn address_policy() -> AuditPolicy<Address> {
    AuditPolicy::new()
}

pub fn home_address_policy() -> AuditPolicy<HomeAddress> {
    address_policy()
        .for_subtype(|home: &HomeAddress| &home.0)
        .with_name_strategy(NameStrategy::Short)
}

/// Inherits the person policy and only audits creation and the final rename
pub fn secretive_person_policy() -> AuditPolicy<SecretivePerson> {
    person_policy()
        .for_subtype(|secretive: &SecretivePerson| &secretive.0)
        .with_guard(|secretive: &SecretivePerson, action| {
            action == Action::Create || secretive.0.name == "Marky Mark"
        })
}

/// Stand-in for the persistence layer: assigns ids and audits each save
pub struct Repository<S: AuditStore> {
    pub auditor: Auditor<S>,
    next_id: Cell<u32>,
}

impl Repository<MemoryAuditStore> {
    pub fn in_memory() -> Self {
        Self::new(MemoryAuditStore::new())
    }
}

impl<S: AuditStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self {
            auditor: Auditor::new(store),
            next_id: Cell::new(1),
        }
    }

    pub fn next_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    pub fn create_person(
        &self,
        person: &mut Person,
        policy: &AuditPolicy<Person>,
        actor: Option<&dyn Actor>,
    ) -> AuditResult<AuditOutcome> {
        person.id = self.next_id();
        if let Some(address) = person.address.as_mut() {
            address.id = self.next_id();
        }
        self.auditor.created(person, policy, actor)
    }

    /// Save an existing person; a replaced address gets a fresh id
    pub fn save_person(
        &self,
        person: &mut Person,
        policy: &AuditPolicy<Person>,
        actor: Option<&dyn Actor>,
    ) -> AuditResult<AuditOutcome> {
        if let Some(address) = person.address.as_mut() {
            if address.id == 0 {
                address.id = self.next_id();
            }
        }
        self.auditor.updated(person, policy, actor)
    }

    pub fn create_address(
        &self,
        address: &mut Address,
        actor: Option<&dyn Actor>,
    ) -> AuditResult<AuditOutcome> {
        address.id = self.next_id();
        self.auditor.created(address, &address_policy(), actor)
    }

    pub fn create_home_address(
        &self,
        home: &mut HomeAddress,
        actor: Option<&dyn Actor>,
    ) -> AuditResult<AuditOutcome> {
        home.0.id = self.next_id();
        self.auditor.created(home, &home_address_policy(), actor)
    }

    pub fn create_secretive(&self, secretive: &mut SecretivePerson) -> AuditResult<AuditOutcome> {
        secretive.0.id = self.next_id();
        if let Some(address) = secretive.0.address.as_mut() {
            address.id = self.next_id();
        }
        self.auditor.created(secretive, &secretive_person_policy(), None)
    }

    pub fn save_secretive(&self, secretive: &mut SecretivePerson) -> AuditResult<AuditOutcome> {
        if let Some(address) = secretive.0.address.as_mut() {
            if address.id == 0 {
                address.id = self.next_id();
            }
        }
        self.auditor.updated(secretive, &secretive_person_policy(), None)
    }
}

pub fn mihai() -> Person {
    Person::new(
        "Mihai Tarnovan",
        "mihai.tarnovan@cubus.ro",
        Address::new("M. Viteazu nr. 11 sc. C ap.32", "550350"),
    )
}

pub fn gabriel() -> Person {
    Person::new(
        "Gabriel Tarnovan",
        "gabriel.tarnovan@cubus.ro",
        Address::new("Calea Lunga nr. 104 Sibiu 123500", ""),
    )
}
