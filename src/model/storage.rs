use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::types::Source;
use crate::model::action::{Action, Subject};
use crate::model::event::Event;

/// A storage mount, identified by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageMount {
    pub name: String,
}

impl PartialEq for StorageMount {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for StorageMount {}

impl Hash for StorageMount {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl StorageMount {
    pub const ATTACH: &'static str = "attach";
    pub const DETACH: &'static str = "detach";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn subject(&self) -> Subject {
        Subject::Storage(self.name.clone())
    }

    pub fn attached(&self) -> Event {
        Event::new(format!("{}-storage-attached", self.name))
    }

    pub fn detached(&self) -> Event {
        Event::new(format!("{}-storage-detached", self.name))
    }

    pub fn attach(&self) -> Action {
        Action::new(self.subject(), Self::ATTACH, Source::User)
    }

    pub fn detach(&self) -> Action {
        Action::new(self.subject(), Self::DETACH, Source::User)
    }
}
