use thiserror::Error;

use crate::core::types::Phase;

#[derive(Error, Debug)]
pub enum SimError {
    // === CONSTRUCTION ===
    #[error("scale must be at least 1, got {0}")]
    InvalidScale(u32),

    #[error("peer relations {0:?} cannot be potential; they either are or aren't")]
    PotentialPeerRelation(Vec<String>),

    #[error("relation {0:?} is listed both as present and as potential")]
    ConflictingRelation(String),

    #[error("storage {0:?} is listed both as attached and as potential")]
    ConflictingStorage(String),

    #[error("relation {0:?} is listed more than once")]
    DuplicateRelation(String),

    #[error("storage {0:?} is listed more than once")]
    DuplicateStorage(String),

    #[error("chance for {kind} in {phase} must be within [0, 1], got {value}")]
    InvalidChance {
        phase: Phase,
        kind: &'static str,
        value: f64,
    },

    // === INVARIANT VIOLATIONS ===
    #[error("attempting to join non-existing relation {0:?}")]
    JoinUnknownRelation(String),

    #[error("attempting to re-join relation {0:?}")]
    RejoinRelation(String),

    #[error("attempting to depart non-existing relation {0:?}")]
    DepartUnknownRelation(String),

    #[error("attempting to depart non-joined relation {0:?}")]
    DepartNotJoined(String),

    #[error("attempting to re-attach storage {0:?}")]
    ReattachStorage(String),

    #[error("attempting to detach unknown storage {0:?}")]
    DetachUnknownStorage(String),

    #[error("relation {0:?} is neither present nor potential")]
    UnknownRelation(String),

    #[error("storage {0:?} is neither attached nor potential")]
    UnknownStorage(String),

    // === UNRECOGNIZED OPERATIONS ===
    #[error("{subject_kind}-action {name:?} not recognized")]
    UnrecognizedAction {
        subject_kind: &'static str,
        name: String,
    },

    // === RUN LIFECYCLE ===
    #[error("phase {0} was already entered in this run")]
    PhaseReentered(Phase),

    #[error("events can only be queued inside a phase")]
    NoActivePhase,

    #[error("no legal action left to execute")]
    EmptyActionPool,

    // === AMBIENT ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
