use serde::{Deserialize, Serialize};

use crate::model::event::Event;

/// A workload container managed by the unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The workload in this container is ready to be configured
    pub fn pebble_ready(&self) -> Event {
        Event::new(format!("{}-pebble-ready", self.name))
    }
}
