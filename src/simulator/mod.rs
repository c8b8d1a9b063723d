//! Charm event simulator
//!
//! Generates pseudorandom, lifecycle-valid traces of the events and actions a
//! charm unit observes from birth to removal. A run goes through three
//! phases (setup, operation, teardown); every emitted event funnels through
//! the background-event injector in `queue`, and the operation phase drives
//! the action engine in `exec`.

pub mod exec;
pub mod phase;
pub mod pool;
pub mod queue;
pub mod scenario;

pub use phase::PhaseGuard;
pub use pool::ActionPool;
pub use scenario::{Scenario, Step};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::{ChanceTable, MustOccurTable, SimulatorConfig};
use crate::core::error::{Result, SimError};
use crate::core::types::{Phase, Platform};
use crate::model::{Action, Container, Relation, StorageMount};

/// The simulator state: one mutable aggregate with a single writer
pub struct CharmEventSimulator {
    is_leader: bool,
    /// Number of units in the application; never below 1
    scale: u32,
    current_phase: Option<Phase>,
    /// Last phase entered since construction or `clear()`
    last_entered: Option<Phase>,

    relations: Vec<Relation>,
    storage_mounts: Vec<StorageMount>,
    containers: Vec<Container>,
    potential_relations: Vec<Relation>,
    potential_storage_mounts: Vec<StorageMount>,

    max_operation_length: u32,
    platform: Platform,
    chances: ChanceTable,
    must_occur: MustOccurTable,

    possible_actions: ActionPool,
    scenario: Scenario,

    rng: ChaCha8Rng,
    seed: u64,
}

impl CharmEventSimulator {
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(|| rand::random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut possible_actions = ActionPool::new();
        // at any point in time any storage we have might be detached
        for storage in &config.storage_mounts {
            possible_actions.insert(storage.detach());
        }
        for relation in &config.relations {
            // another charm might touch the databag
            possible_actions.insert(relation.change(&mut rng));
            if !relation.is_peer {
                possible_actions.insert(relation.destroy());
            }
            if relation.is_joined {
                possible_actions.insert(relation.depart());
            } else {
                possible_actions.insert(relation.join());
            }
        }
        possible_actions.insert(Action::change_config());
        possible_actions.insert(Action::scale_up());
        possible_actions.insert(Action::leadership_change(&mut rng));
        for relation in &config.potential_relations {
            possible_actions.insert(relation.create());
        }
        for storage in &config.potential_storage_mounts {
            possible_actions.insert(storage.attach());
        }
        if config.scale > 1 {
            possible_actions.insert(Action::scale_down());
        }

        tracing::debug!(
            seed,
            legal_actions = possible_actions.len(),
            "simulator initialised"
        );

        Ok(Self {
            is_leader: config.is_leader,
            scale: config.scale,
            current_phase: None,
            last_entered: None,
            relations: config.relations,
            storage_mounts: config.storage_mounts,
            containers: config.containers,
            potential_relations: config.potential_relations,
            potential_storage_mounts: config.potential_storage_mounts,
            max_operation_length: config.max_operation_length,
            platform: config.platform,
            chances: config.chances,
            must_occur: config.must_occur,
            possible_actions,
            scenario: Scenario::new(),
            rng,
            seed,
        })
    }

    /// Reset the trace. Relation, storage, leadership and scale state are kept.
    pub fn clear(&mut self) {
        self.scenario = Scenario::new();
        self.last_entered = None;
    }

    pub fn add_relation(&mut self, relation: Relation) {
        if !self.relations.contains(&relation) {
            self.relations.push(relation);
        }
    }

    pub fn remove_relation(&mut self, name: &str) -> Option<Relation> {
        let index = self.relation_index(name)?;
        Some(self.relations.remove(index))
    }

    pub fn attach_storage(&mut self, storage: StorageMount) {
        if !self.storage_mounts.contains(&storage) {
            self.storage_mounts.push(storage);
        }
    }

    pub fn detach_storage(&mut self, name: &str) -> Option<StorageMount> {
        let index = self.storage_mounts.iter().position(|s| s.name == name)?;
        Some(self.storage_mounts.remove(index))
    }

    // === ACCESSORS ===

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn into_scenario(self) -> Scenario {
        self.scenario
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn storage_mounts(&self) -> &[StorageMount] {
        &self.storage_mounts
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn potential_relations(&self) -> &[Relation] {
        &self.potential_relations
    }

    pub fn potential_storage_mounts(&self) -> &[StorageMount] {
        &self.potential_storage_mounts
    }

    pub fn possible_actions(&self) -> &ActionPool {
        &self.possible_actions
    }

    pub fn is_leader(&self) -> bool {
        self.is_leader
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.current_phase
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn max_operation_length(&self) -> u32 {
        self.max_operation_length
    }

    /// Seed of the random source, for replaying a trace
    pub fn seed(&self) -> u64 {
        self.seed
    }

    // === LOOKUPS ===

    fn relation_index(&self, name: &str) -> Option<usize> {
        self.relations.iter().position(|r| r.name == name)
    }

    /// The relation called `name`, whether present or only potential
    fn known_relation(&self, name: &str) -> Result<Relation> {
        self.relations
            .iter()
            .chain(&self.potential_relations)
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| SimError::UnknownRelation(name.to_string()))
    }

    fn has_storage(&self, name: &str) -> bool {
        self.storage_mounts.iter().any(|s| s.name == name)
    }

    /// Attached now or attachable later
    fn is_known_storage(&self, name: &str) -> bool {
        self.has_storage(name) || self.potential_storage_mounts.iter().any(|s| s.name == name)
    }

    fn peer_relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter().filter(|r| r.is_peer)
    }

    fn joined_relations(&self) -> Vec<Relation> {
        self.relations.iter().filter(|r| r.is_joined).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Subject;

    fn demo() -> CharmEventSimulator {
        CharmEventSimulator::new(SimulatorConfig::demo().with_seed(42)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SimulatorConfig { scale: 0, ..Default::default() };
        assert!(matches!(CharmEventSimulator::new(config), Err(SimError::InvalidScale(0))));

        let config = SimulatorConfig {
            potential_relations: vec![Relation::peer("replicas")],
            ..Default::default()
        };
        assert!(matches!(
            CharmEventSimulator::new(config),
            Err(SimError::PotentialPeerRelation(_))
        ));
    }

    #[test]
    fn test_initial_pool() {
        let sim = demo();
        let pool = sim.possible_actions();
        let http = Relation::new("http");
        let replicas = Relation::peer("replicas");

        assert!(pool.contains(&StorageMount::new("storage1").detach()));
        assert!(pool.allows(&http.subject(), Relation::CHANGE));
        assert!(pool.allows(&replicas.subject(), Relation::CHANGE));
        assert!(pool.contains(&http.destroy()));
        assert!(pool.contains(&http.join()));
        assert!(pool.contains(&replicas.join()));
        assert!(pool.contains(&Relation::new("mongo").create()));
        assert!(pool.contains(&StorageMount::new("ephemeral1").attach()));
        assert!(pool.contains(&Action::change_config()));
        assert!(pool.contains(&Action::scale_up()));
        assert!(pool.allows(&Subject::Global, Action::LEADERSHIP_CHANGE));

        // peers are never broken, nothing is joined yet, and scale is at its floor
        assert!(!pool.contains(&replicas.destroy()));
        assert!(!pool.contains(&replicas.depart()));
        assert!(!pool.contains(&http.depart()));
        assert!(!pool.contains(&Action::scale_down()));
    }

    #[test]
    fn test_scale_down_legal_above_floor() {
        let sim = CharmEventSimulator::new(SimulatorConfig { scale: 3, ..Default::default() }).unwrap();
        assert!(sim.possible_actions().contains(&Action::scale_down()));
    }

    #[test]
    fn test_joined_relation_starts_departable() {
        let mut db = Relation::new("db");
        db.is_joined = true;
        let sim = CharmEventSimulator::new(SimulatorConfig {
            relations: vec![db.clone()],
            ..Default::default()
        })
        .unwrap();
        assert!(sim.possible_actions().contains(&db.depart()));
        assert!(!sim.possible_actions().contains(&db.join()));
    }

    #[test]
    fn test_seed_is_recorded() {
        assert_eq!(demo().seed(), 42);
    }

    #[test]
    fn test_entity_helpers() {
        let mut sim = demo();
        sim.add_relation(Relation::new("http"));
        assert_eq!(sim.relations().len(), 2);

        sim.add_relation(Relation::new("mongo"));
        assert_eq!(sim.relations().len(), 3);
        assert_eq!(sim.remove_relation("mongo").map(|r| r.name), Some("mongo".to_string()));
        assert!(sim.remove_relation("mongo").is_none());

        sim.attach_storage(StorageMount::new("ephemeral1"));
        assert!(sim.has_storage("ephemeral1"));
        assert!(sim.detach_storage("ephemeral1").is_some());
        assert!(!sim.has_storage("ephemeral1"));
    }

    #[test]
    fn test_known_relation_covers_potential() {
        let sim = demo();
        assert!(sim.known_relation("http").is_ok());
        assert!(sim.known_relation("mongo").is_ok());
        assert!(matches!(sim.known_relation("kafka"), Err(SimError::UnknownRelation(_))));
    }

    #[test]
    fn test_known_storage_covers_potential() {
        let sim = demo();
        assert!(sim.is_known_storage("storage1"));
        assert!(sim.is_known_storage("ephemeral1"));
        assert!(!sim.is_known_storage("ghost"));
    }
}
