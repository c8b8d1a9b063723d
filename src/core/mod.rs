pub mod config;
pub mod error;
pub mod types;

pub use config::{ChanceTable, MustOccurTable, SimulatorConfig};
pub use error::{Result, SimError};
pub use types::{BackgroundKind, Phase, Platform, Source};
