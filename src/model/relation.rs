use std::hash::{Hash, Hasher};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::Source;
use crate::model::action::{Action, Subject};
use crate::model::event::Event;

/// A relation endpoint of the unit.
///
/// Identity is the relation name; `is_joined` is runtime state and does not
/// take part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    #[serde(default)]
    pub is_peer: bool,
    #[serde(default)]
    pub is_joined: bool,
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Relation {}

impl Hash for Relation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Relation {
    pub const CHANGE: &'static str = "change";
    pub const CREATE: &'static str = "create";
    pub const DESTROY: &'static str = "break";
    pub const JOIN: &'static str = "join";
    pub const DEPART: &'static str = "depart";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_peer: false,
            is_joined: false,
        }
    }

    pub fn peer(name: impl Into<String>) -> Self {
        Self {
            is_peer: true,
            ..Self::new(name)
        }
    }

    pub fn subject(&self) -> Subject {
        Subject::Relation(self.name.clone())
    }

    fn event(&self, kind: &str) -> Event {
        Event::new(format!("{}-relation-{}", self.name, kind))
    }

    pub fn created(&self) -> Event {
        self.event("created")
    }

    pub fn broken(&self) -> Event {
        self.event("broken")
    }

    pub fn changed(&self) -> Event {
        self.event("changed")
    }

    pub fn joined(&self) -> Event {
        self.event("joined")
    }

    pub fn departed(&self) -> Event {
        self.event("departed")
    }

    /// Some charm touches the relation databag
    pub fn change<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        Action::new(self.subject(), Self::CHANGE, Source::random_charm(rng))
    }

    pub fn create(&self) -> Action {
        Action::new(self.subject(), Self::CREATE, Source::User)
    }

    pub fn destroy(&self) -> Action {
        Action::new(self.subject(), Self::DESTROY, Source::User)
    }

    pub fn join(&self) -> Action {
        Action::new(self.subject(), Self::JOIN, Source::User)
    }

    pub fn depart(&self) -> Action {
        Action::new(self.subject(), Self::DEPART, Source::User)
    }
}
