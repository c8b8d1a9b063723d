//! Simulator configuration with documented defaults
//!
//! Everything the simulator needs at construction time lives here. Values are
//! validated eagerly by `CharmEventSimulator::new`; nothing is re-checked
//! during a run.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{BackgroundKind, Phase, Platform};
use crate::model::{Container, Relation, StorageMount};

/// Chance that a background event of a given kind is spliced in next to any
/// caused event, per phase.
///
/// Indexed by `(Phase, BackgroundKind)`. The update-status column can be
/// tweaked to simulate how long a phase lasts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChanceTable([[f64; 2]; 3]);

impl ChanceTable {
    pub fn new(table: [[f64; 2]; 3]) -> Self {
        Self(table)
    }

    pub fn get(&self, phase: Phase, kind: BackgroundKind) -> f64 {
        self.0[phase.index()][kind.index()]
    }

    pub fn set(&mut self, phase: Phase, kind: BackgroundKind, chance: f64) {
        self.0[phase.index()][kind.index()] = chance;
    }

    pub fn validate(&self) -> Result<()> {
        for phase in Phase::ALL {
            for kind in BackgroundKind::ALL {
                let value = self.get(phase, kind);
                if !(0.0..=1.0).contains(&value) {
                    return Err(SimError::InvalidChance {
                        phase,
                        kind: kind.as_str(),
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for ChanceTable {
    fn default() -> Self {
        Self([
            // setup: containers come up early, so readiness is frequent
            [0.20, 0.10],
            // operation
            [0.05, 0.10],
            // teardown
            [0.01, 0.05],
        ])
    }
}

/// Whether an event kind must occur at least once in a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MustOccurTable([[bool; 2]; 3]);

impl MustOccurTable {
    pub fn new(table: [[bool; 2]; 3]) -> Self {
        Self(table)
    }

    pub fn get(&self, phase: Phase, kind: BackgroundKind) -> bool {
        self.0[phase.index()][kind.index()]
    }

    pub fn set(&mut self, phase: Phase, kind: BackgroundKind, required: bool) {
        self.0[phase.index()][kind.index()] = required;
    }
}

impl Default for MustOccurTable {
    fn default() -> Self {
        // Only container readiness during setup is mandatory.
        Self([[true, false], [false, false], [false, false]])
    }
}

/// Construction-time configuration of a `CharmEventSimulator`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Whether this unit starts out as leader; only meaningful with relations
    pub is_leader: bool,

    /// Relations the unit is born with
    pub relations: Vec<Relation>,

    /// Workload containers of the unit
    pub containers: Vec<Container>,

    /// Storage attached from birth
    pub storage_mounts: Vec<StorageMount>,

    /// Relations the unit supports and may gain during its lifetime.
    /// Must not contain peer relations.
    pub potential_relations: Vec<Relation>,

    /// Storage the unit supports and may have attached during its lifetime
    pub potential_storage_mounts: Vec<StorageMount>,

    /// The operation phase runs `max_operation_length + 1` actions
    pub max_operation_length: u32,

    /// Initial number of units in the application; must be >= 1
    pub scale: u32,

    pub platform: Platform,

    /// Seed for the random source; `None` draws one from entropy
    pub seed: Option<u64>,

    pub chances: ChanceTable,

    pub must_occur: MustOccurTable,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            is_leader: true,
            relations: Vec::new(),
            containers: vec![Container::new("workload")],
            storage_mounts: Vec::new(),
            potential_relations: Vec::new(),
            potential_storage_mounts: Vec::new(),
            max_operation_length: 10,
            scale: 1,
            platform: Platform::K8s,
            seed: None,
            chances: ChanceTable::default(),
            must_occur: MustOccurTable::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// The demo deployment: a unit with one attached storage, a regular and a
    /// peer relation, and one potential relation and storage each.
    pub fn demo() -> Self {
        Self {
            storage_mounts: vec![StorageMount::new("storage1")],
            relations: vec![Relation::new("http"), Relation::peer("replicas")],
            potential_relations: vec![Relation::new("mongo")],
            potential_storage_mounts: vec![StorageMount::new("ephemeral1")],
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.scale < 1 {
            return Err(SimError::InvalidScale(self.scale));
        }

        let potential_peers: Vec<String> = self
            .potential_relations
            .iter()
            .filter(|r| r.is_peer)
            .map(|r| r.name.clone())
            .collect();
        if !potential_peers.is_empty() {
            return Err(SimError::PotentialPeerRelation(potential_peers));
        }

        for relations in [&self.relations, &self.potential_relations] {
            if let Some(name) = first_duplicate(relations.iter().map(|r| r.name.as_str())) {
                return Err(SimError::DuplicateRelation(name.to_string()));
            }
        }
        for mounts in [&self.storage_mounts, &self.potential_storage_mounts] {
            if let Some(name) = first_duplicate(mounts.iter().map(|s| s.name.as_str())) {
                return Err(SimError::DuplicateStorage(name.to_string()));
            }
        }

        if let Some(r) = self
            .potential_relations
            .iter()
            .find(|p| self.relations.iter().any(|r| r.name == p.name))
        {
            return Err(SimError::ConflictingRelation(r.name.clone()));
        }

        if let Some(s) = self
            .potential_storage_mounts
            .iter()
            .find(|p| self.storage_mounts.iter().any(|s| s.name == p.name))
        {
            return Err(SimError::ConflictingStorage(s.name.clone()));
        }

        self.chances.validate()
    }
}

fn first_duplicate<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = BTreeSet::new();
    names.into_iter().find(|name| !seen.insert(*name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chances() {
        let chances = ChanceTable::default();
        assert_eq!(chances.get(Phase::Setup, BackgroundKind::ContainerReady), 0.20);
        assert_eq!(chances.get(Phase::Setup, BackgroundKind::StatusUpdate), 0.10);
        assert_eq!(chances.get(Phase::Operation, BackgroundKind::ContainerReady), 0.05);
        assert_eq!(chances.get(Phase::Operation, BackgroundKind::StatusUpdate), 0.10);
        assert_eq!(chances.get(Phase::Teardown, BackgroundKind::ContainerReady), 0.01);
        assert_eq!(chances.get(Phase::Teardown, BackgroundKind::StatusUpdate), 0.05);
    }

    #[test]
    fn test_default_must_occur() {
        let policy = MustOccurTable::default();
        assert!(policy.get(Phase::Setup, BackgroundKind::ContainerReady));
        for phase in Phase::ALL {
            assert!(!policy.get(phase, BackgroundKind::StatusUpdate));
        }
        assert!(!policy.get(Phase::Operation, BackgroundKind::ContainerReady));
        assert!(!policy.get(Phase::Teardown, BackgroundKind::ContainerReady));
    }

    #[test]
    fn test_default_config() {
        let config = SimulatorConfig::default();
        assert!(config.is_leader);
        assert_eq!(config.containers, vec![Container::new("workload")]);
        assert_eq!(config.max_operation_length, 10);
        assert_eq!(config.scale, 1);
        assert_eq!(config.platform, Platform::K8s);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_scale_rejected() {
        let config = SimulatorConfig { scale: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(SimError::InvalidScale(0))));
    }

    #[test]
    fn test_potential_peer_rejected() {
        let config = SimulatorConfig {
            potential_relations: vec![Relation::new("db"), Relation::peer("cluster")],
            ..Default::default()
        };
        match config.validate() {
            Err(SimError::PotentialPeerRelation(names)) => assert_eq!(names, vec!["cluster"]),
            other => panic!("expected peer rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_relation_rejected() {
        let config = SimulatorConfig {
            relations: vec![Relation::new("db")],
            potential_relations: vec![Relation::new("db")],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::ConflictingRelation(_))));
    }

    #[test]
    fn test_conflicting_storage_rejected() {
        let config = SimulatorConfig {
            storage_mounts: vec![StorageMount::new("data")],
            potential_storage_mounts: vec![StorageMount::new("data")],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::ConflictingStorage(_))));
    }

    #[test]
    fn test_duplicate_relation_rejected() {
        let config = SimulatorConfig {
            relations: vec![Relation::new("db"), Relation::new("http"), Relation::new("db")],
            ..Default::default()
        };
        match config.validate() {
            Err(SimError::DuplicateRelation(name)) => assert_eq!(name, "db"),
            other => panic!("expected duplicate rejection, got {:?}", other),
        }

        // identity is the name alone
        let config = SimulatorConfig {
            relations: vec![Relation::new("replicas"), Relation::peer("replicas")],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::DuplicateRelation(_))));

        let config = SimulatorConfig {
            potential_relations: vec![Relation::new("mongo"), Relation::new("mongo")],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::DuplicateRelation(_))));
    }

    #[test]
    fn test_duplicate_storage_rejected() {
        let config = SimulatorConfig {
            storage_mounts: vec![StorageMount::new("data"), StorageMount::new("data")],
            ..Default::default()
        };
        match config.validate() {
            Err(SimError::DuplicateStorage(name)) => assert_eq!(name, "data"),
            other => panic!("expected duplicate rejection, got {:?}", other),
        }

        let config = SimulatorConfig {
            potential_storage_mounts: vec![StorageMount::new("cache"), StorageMount::new("cache")],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::DuplicateStorage(_))));
    }

    #[test]
    fn test_out_of_range_chance_rejected() {
        let mut config = SimulatorConfig::default();
        config.chances.set(Phase::Teardown, BackgroundKind::StatusUpdate, 1.5);
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidChance { phase: Phase::Teardown, .. })
        ));
    }

    #[test]
    fn test_partial_toml() {
        let config = SimulatorConfig::from_toml_str(
            r#"
            is_leader = false
            max_operation_length = 3
            platform = "lxd"

            [[relations]]
            name = "replicas"
            is_peer = true
            "#,
        )
        .unwrap();

        assert!(!config.is_leader);
        assert_eq!(config.max_operation_length, 3);
        assert_eq!(config.platform, Platform::Lxd);
        assert_eq!(config.relations, vec![Relation::peer("replicas")]);
        assert!(config.relations[0].is_peer);
        assert!(!config.relations[0].is_joined);
        assert_eq!(config.containers, vec![Container::new("workload")]);
        assert_eq!(config.chances, ChanceTable::default());
    }
}
