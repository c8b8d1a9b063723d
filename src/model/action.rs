//! Actions: named operations drawn from the pool of currently legal ones

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::Source;

/// What an action operates on, by the entity's stable name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Subject {
    /// Generic actions on the application as a whole
    Global,
    Relation(String),
    Storage(String),
}

impl Subject {
    pub fn kind(&self) -> &'static str {
        match self {
            Subject::Global => "Global",
            Subject::Relation(_) => "Relation",
            Subject::Storage(_) => "StorageMount",
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Subject::Global => None,
            Subject::Relation(name) | Subject::Storage(name) => Some(name),
        }
    }
}

/// Logical identity of an action in the legal-action pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionKey {
    pub subject: Subject,
    pub name: String,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub subject: Subject,
    pub name: String,
    pub source: Source,
}

impl Action {
    pub const CONFIG_CHANGE: &'static str = "config-change";
    pub const SCALE_UP: &'static str = "scale+";
    pub const SCALE_DOWN: &'static str = "scale-";
    pub const LEADERSHIP_CHANGE: &'static str = "leadership_change";

    pub fn new(subject: Subject, name: impl Into<String>, source: Source) -> Self {
        Self {
            subject,
            name: name.into(),
            source,
        }
    }

    pub fn key(&self) -> ActionKey {
        ActionKey {
            subject: self.subject.clone(),
            name: self.name.clone(),
            source: self.source,
        }
    }

    // Generic actions the user might perform at any time.

    pub fn change_config() -> Self {
        Self::new(Subject::Global, Self::CONFIG_CHANGE, Source::User)
    }

    pub fn scale_up() -> Self {
        Self::new(Subject::Global, Self::SCALE_UP, Source::User)
    }

    pub fn scale_down() -> Self {
        Self::new(Subject::Global, Self::SCALE_DOWN, Source::User)
    }

    /// Leadership moving to or away from this unit; attributed to a freshly
    /// drawn source on every call.
    pub fn leadership_change<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(Subject::Global, Self::LEADERSHIP_CHANGE, Source::random(rng))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {:?}", self.source, self.name)?;
        if let Some(subject) = self.subject.name() {
            write!(f, "({})", subject)?;
        }
        Ok(())
    }
}
