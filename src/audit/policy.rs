//! Per-entity-type audit policy
//!
//! A policy is plain configuration data that the auditor consults on every
//! save or destroy: which fields to capture, whether this save should be
//! audited at all, how to name the actor and how associations cascade.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;

use super::actor::NameStrategy;
use super::record::Action;

/// Predicate deciding whether a save is audited
pub type Guard<E> = Arc<dyn Fn(&E, Action) -> bool + Send + Sync>;

/// When an update produces a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditTrigger {
    /// Every persisted save is recorded, even if no audited field changed
    #[default]
    Always,
    /// Updates are recorded only when an audited field differs from the last record
    AuditedChange,
}

/// How declared associations are audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CascadeMode {
    /// Associations appear only as nested maps in the owner's record
    #[default]
    Embed,
    /// Additionally record each new or changed association under its own identity
    EmbedAndTrack,
}

/// Audit configuration for one entity type
pub struct AuditPolicy<E: ?Sized> {
    fields: Option<Vec<String>>,
    guard: Option<Guard<E>>,
    name_strategy: NameStrategy,
    trigger: AuditTrigger,
    cascade: CascadeMode,
}

impl<E: ?Sized> Clone for AuditPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            guard: self.guard.clone(),
            name_strategy: self.name_strategy,
            trigger: self.trigger,
            cascade: self.cascade,
        }
    }
}

impl<E: ?Sized> Default for AuditPolicy<E> {
    fn default() -> Self {
        Self {
            fields: None,
            guard: None,
            name_strategy: NameStrategy::default(),
            trigger: AuditTrigger::default(),
            cascade: CascadeMode::default(),
        }
    }
}

impl<E: ?Sized> fmt::Debug for AuditPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditPolicy")
            .field("fields", &self.fields)
            .field("guard", &self.guard.as_ref().map(|_| "<fn>"))
            .field("name_strategy", &self.name_strategy)
            .field("trigger", &self.trigger)
            .field("cascade", &self.cascade)
            .finish()
    }
}

impl<E: ?Sized + 'static> AuditPolicy<E> {
    /// Audit all attributes, always, naming actors by full name
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the configured deployment defaults
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .with_name_strategy(settings.default_name_strategy)
            .with_trigger(settings.default_trigger)
    }

    /// Audit only these fields
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Go back to the entity's own field declaration
    pub fn with_all_fields(mut self) -> Self {
        self.fields = None;
        self
    }

    /// Only audit saves for which `guard` returns true
    pub fn with_guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&E, Action) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }

    pub fn without_guard(mut self) -> Self {
        self.guard = None;
        self
    }

    pub fn with_name_strategy(mut self, strategy: NameStrategy) -> Self {
        self.name_strategy = strategy;
        self
    }

    pub fn with_trigger(mut self, trigger: AuditTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_cascade(mut self, cascade: CascadeMode) -> Self {
        self.cascade = cascade;
        self
    }

    /// Re-target this policy at a type that wraps `E`
    ///
    /// Every option carries over; the guard sees the wrapped entity through
    /// `upcast`. The result can then override any single option.
    pub fn for_subtype<S: ?Sized + 'static>(&self, upcast: fn(&S) -> &E) -> AuditPolicy<S> {
        let guard = self.guard.clone().map(|parent| {
            let guard: Guard<S> = Arc::new(move |entity: &S, action| parent(upcast(entity), action));
            guard
        });

        AuditPolicy {
            fields: self.fields.clone(),
            guard,
            name_strategy: self.name_strategy,
            trigger: self.trigger,
            cascade: self.cascade,
        }
    }
}

impl<E: ?Sized> AuditPolicy<E> {
    /// Explicitly configured fields, if any
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    pub fn name_strategy(&self) -> NameStrategy {
        self.name_strategy
    }

    pub fn trigger(&self) -> AuditTrigger {
        self.trigger
    }

    pub fn cascade(&self) -> CascadeMode {
        self.cascade
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }

    /// Evaluate the guard for this save
    ///
    /// Called on every save; results are never cached.
    pub fn allows(&self, entity: &E, action: Action) -> bool {
        self.guard.as_ref().map_or(true, |guard| guard(entity, action))
    }
}
