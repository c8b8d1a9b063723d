//! Domain model of a charm unit: events, actions and the entities that
//! derive them.

pub mod action;
pub mod container;
pub mod event;
pub mod relation;
pub mod storage;

pub use action::{Action, ActionKey, Subject};
pub use container::Container;
pub use event::Event;
pub use relation::Relation;
pub use storage::StorageMount;
