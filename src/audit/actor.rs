//! Actor resolution
//!
//! Decides which display name is stamped on an audit record. The acting user
//! is passed in explicitly by whoever performs the save; different actor
//! types expose different names, and each entity type picks which one it
//! prefers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which display name an entity type records for its actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NameStrategy {
    /// Short handle, e.g. "mtarnovan"
    Short,
    /// Full name, e.g. "Mihai Tarnovan"
    #[default]
    Full,
}

impl fmt::Display for NameStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameStrategy::Short => write!(f, "short"),
            NameStrategy::Full => write!(f, "full"),
        }
    }
}

/// Something that can perform an audited action
///
/// Implementors expose whichever names they have; both default to `None`.
pub trait Actor {
    fn short_name(&self) -> Option<String> {
        None
    }

    fn full_name(&self) -> Option<String> {
        None
    }
}

/// Ready-made actor variants for callers without their own user type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ActorKind {
    /// Actor known only by a short handle
    ShortName(String),
    /// Actor known only by a full name
    FullName(String),
    /// Actor whose identity could not be established
    Unknown,
}

impl ActorKind {
    /// The one name this variant carries
    pub fn display_name(&self) -> Option<&str> {
        match self {
            ActorKind::ShortName(name) | ActorKind::FullName(name) => Some(name),
            ActorKind::Unknown => None,
        }
    }
}

impl Actor for ActorKind {
    fn short_name(&self) -> Option<String> {
        match self {
            ActorKind::ShortName(name) => Some(name.clone()),
            _ => None,
        }
    }

    fn full_name(&self) -> Option<String> {
        match self {
            ActorKind::FullName(name) => Some(name.clone()),
            _ => None,
        }
    }
}

/// Resolve the username to record for an action
///
/// The preferred name is used when the actor exposes it, otherwise the other
/// name it exposes. No actor, or an actor exposing no name at all, resolves
/// to `None` rather than failing the audit.
pub fn resolve_username(actor: Option<&dyn Actor>, strategy: NameStrategy) -> Option<String> {
    let actor = actor?;

    let (preferred, fallback) = match strategy {
        NameStrategy::Short => (actor.short_name(), actor.full_name()),
        NameStrategy::Full => (actor.full_name(), actor.short_name()),
    };

    let resolved = preferred
        .or_else(|| {
            tracing::debug!(%strategy, "Actor has no preferred name, falling back");
            fallback
        })
        .filter(|name| !name.trim().is_empty());

    if resolved.is_none() {
        tracing::debug!(%strategy, "Actor exposes no display name; recording without username");
    }

    resolved
}
