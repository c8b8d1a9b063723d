//! Charm Sim - lifecycle-valid event trace generator for charm testing

pub mod core;
pub mod model;
pub mod simulator;

pub use crate::core::{Phase, Platform, Result, SimError, SimulatorConfig, Source};
pub use crate::model::{Action, Container, Event, Relation, StorageMount, Subject};
pub use crate::simulator::{CharmEventSimulator, Scenario, Step};
