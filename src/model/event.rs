//! Events observed by the unit

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::BackgroundKind;

const RELATION_JOINED_SUFFIX: &str = "-relation-joined";
const RELATION_CHANGED_SUFFIX: &str = "-relation-changed";
const PEBBLE_READY_SUFFIX: &str = "-pebble-ready";

/// A named occurrence with no further state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn install() -> Self {
        Self::new("install")
    }

    pub fn start() -> Self {
        Self::new("start")
    }

    pub fn stop() -> Self {
        Self::new("stop")
    }

    pub fn remove() -> Self {
        Self::new("remove")
    }

    pub fn config_changed() -> Self {
        Self::new("config-changed")
    }

    pub fn leader_elected() -> Self {
        Self::new("leader-elected")
    }

    pub fn leader_settings_changed() -> Self {
        Self::new("leader-settings-changed")
    }

    pub fn update_status() -> Self {
        Self::new(BackgroundKind::StatusUpdate.as_str())
    }

    /// Whether this event may be injected in the background of any phase
    pub fn is_background(&self) -> bool {
        self.name == BackgroundKind::StatusUpdate.as_str()
            || self.name.ends_with(PEBBLE_READY_SUFFIX)
    }

    /// Name of the relation this is a `joined` event of, if any
    pub fn joined_relation(&self) -> Option<&str> {
        self.name.strip_suffix(RELATION_JOINED_SUFFIX)
    }

    /// Name of the relation this is a `changed` event of, if any
    pub fn changed_relation(&self) -> Option<&str> {
        self.name.strip_suffix(RELATION_CHANGED_SUFFIX)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
