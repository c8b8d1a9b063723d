//! Phase orchestration
//!
//! `run` drives setup, operation and teardown once each, in order. Each phase
//! body runs behind a `PhaseGuard`; dropping the guard runs the phase-close
//! hook, so mandatory events are filled in even when a body bails out with
//! an error.

use std::ops::{Deref, DerefMut};

use crate::core::error::{Result, SimError};
use crate::core::types::{BackgroundKind, Phase};
use crate::model::Event;
use crate::simulator::queue::random_insert_keeping_pairs;
use crate::simulator::scenario::Step;
use crate::simulator::CharmEventSimulator;

/// Scoped access to the simulator while a phase is active
pub struct PhaseGuard<'a> {
    sim: &'a mut CharmEventSimulator,
    phase: Phase,
    previous: Option<Phase>,
    _span: tracing::span::EnteredSpan,
}

impl PhaseGuard<'_> {
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl Deref for PhaseGuard<'_> {
    type Target = CharmEventSimulator;

    fn deref(&self) -> &CharmEventSimulator {
        &*self.sim
    }
}

impl DerefMut for PhaseGuard<'_> {
    fn deref_mut(&mut self) -> &mut CharmEventSimulator {
        &mut *self.sim
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.sim.close_phase(self.phase);
        self.sim.current_phase = self.previous;
        tracing::info!("left phase {}", self.phase);
    }
}

impl CharmEventSimulator {
    /// Run the whole lifecycle: setup, operation, teardown
    pub fn run(&mut self) -> Result<()> {
        let span = tracing::info_span!("simulation", seed = self.seed);
        let _enter = span.enter();
        tracing::info!("starting simulation...");

        {
            let mut setup = self.enter_phase(Phase::Setup)?;
            setup.run_setup()?;
        }
        {
            let mut operation = self.enter_phase(Phase::Operation)?;
            operation.run_operation()?;
        }
        {
            let mut teardown = self.enter_phase(Phase::Teardown)?;
            teardown.run_teardown()?;
        }

        tracing::info!(steps = self.scenario.len(), "simulation done");
        Ok(())
    }

    /// Enter `phase`. Phases only move forward; re-entering one requires `clear()`.
    pub fn enter_phase(&mut self, phase: Phase) -> Result<PhaseGuard<'_>> {
        if self.last_entered.is_some_and(|last| last >= phase) {
            return Err(SimError::PhaseReentered(phase));
        }

        let span = tracing::info_span!("phase", %phase).entered();
        tracing::info!("entering phase {}", phase);

        let previous = self.current_phase.replace(phase);
        self.last_entered = Some(phase);
        Ok(PhaseGuard {
            sim: self,
            phase,
            previous,
            _span: span,
        })
    }

    fn run_setup(&mut self) -> Result<()> {
        // any storage available at install is attached
        for storage in self.storage_mounts.clone() {
            self.queue(storage.attached())?;
        }

        self.queue(Event::install())?;

        // any peer relation available at install is created
        let peers: Vec<_> = self.peer_relations().cloned().collect();
        if !peers.is_empty() {
            for relation in &peers {
                self.queue(relation.created())?;
            }
            if self.is_leader {
                self.queue(Event::leader_elected())?;
            } else {
                self.queue(Event::leader_settings_changed())?;
            }
        }

        self.queue(Event::config_changed())?;
        self.queue(Event::start())
    }

    fn run_operation(&mut self) -> Result<()> {
        for _ in 0..=self.max_operation_length {
            let action = self
                .possible_actions
                .choose(&mut self.rng)
                .ok_or(SimError::EmptyActionPool)?;
            self.exec(action)?;
        }
        Ok(())
    }

    fn run_teardown(&mut self) -> Result<()> {
        for relation in self.relations.clone() {
            self.queue(relation.broken())?;
        }
        for storage in self.storage_mounts.clone() {
            self.queue(storage.detached())?;
        }
        self.queue(Event::stop())?;
        self.queue(Event::remove())
    }

    /// Force in any event that must occur in `phase` but did not
    fn close_phase(&mut self, phase: Phase) {
        let trace = self.scenario.phase_mut(phase);

        if self.platform.has_pebble() && self.must_occur.get(phase, BackgroundKind::ContainerReady) {
            for container in &self.containers {
                let ready = container.pebble_ready();
                if !trace.iter().any(|s| s.as_event() == Some(&ready)) {
                    tracing::debug!("forcing {} into {}", ready, phase);
                    random_insert_keeping_pairs(trace, Step::Event(ready), &mut self.rng);
                }
            }
        }

        if self.must_occur.get(phase, BackgroundKind::StatusUpdate) {
            let update = Event::update_status();
            if !trace.iter().any(|s| s.as_event() == Some(&update)) {
                tracing::debug!("forcing {} into {}", update, phase);
                random_insert_keeping_pairs(trace, Step::Event(update), &mut self.rng);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ChanceTable, MustOccurTable, SimulatorConfig};
    use crate::core::types::Platform;
    use crate::model::{Container, Relation};

    fn quiet(config: SimulatorConfig) -> CharmEventSimulator {
        let config = SimulatorConfig {
            chances: ChanceTable::new([[0.0, 0.0]; 3]),
            ..config.with_seed(42)
        };
        CharmEventSimulator::new(config).unwrap()
    }

    fn event_names(sim: &CharmEventSimulator, phase: Phase) -> Vec<String> {
        sim.scenario().events(phase).map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_quiet_demo_setup_order() {
        let mut sim = quiet(SimulatorConfig::demo());
        sim.run().unwrap();

        let setup: Vec<String> = event_names(&sim, Phase::Setup)
            .into_iter()
            .filter(|n| n != "workload-pebble-ready")
            .collect();
        assert_eq!(
            setup,
            vec![
                "storage1-storage-attached",
                "install",
                "replicas-relation-created",
                "leader-elected",
                "config-changed",
                "start",
            ]
        );
    }

    #[test]
    fn test_setup_without_peers_skips_leadership() {
        let mut sim = quiet(SimulatorConfig {
            is_leader: false,
            platform: Platform::Lxd,
            relations: vec![Relation::new("db")],
            ..Default::default()
        });
        sim.run().unwrap();
        assert_eq!(event_names(&sim, Phase::Setup), vec!["install", "config-changed", "start"]);
    }

    #[test]
    fn test_non_leader_peer_setup() {
        let mut sim = quiet(SimulatorConfig {
            is_leader: false,
            platform: Platform::Lxd,
            relations: vec![Relation::peer("replicas")],
            ..Default::default()
        });
        sim.run().unwrap();
        assert_eq!(
            event_names(&sim, Phase::Setup),
            vec!["install", "replicas-relation-created", "leader-settings-changed", "config-changed", "start"]
        );
    }

    #[test]
    fn test_close_forces_every_container_ready() {
        let mut sim = quiet(SimulatorConfig {
            containers: vec![Container::new("nginx"), Container::new("redis")],
            ..Default::default()
        });
        sim.run().unwrap();

        let setup = event_names(&sim, Phase::Setup);
        assert_eq!(setup.iter().filter(|n| *n == "nginx-pebble-ready").count(), 1);
        assert_eq!(setup.iter().filter(|n| *n == "redis-pebble-ready").count(), 1);
        // forced events never land after start
        assert_eq!(setup.last().map(String::as_str), Some("start"));
    }

    #[test]
    fn test_close_honours_status_policy() {
        let mut must_occur = MustOccurTable::default();
        must_occur.set(Phase::Teardown, BackgroundKind::StatusUpdate, true);
        let mut sim = quiet(SimulatorConfig {
            must_occur,
            platform: Platform::Lxd,
            ..Default::default()
        });
        sim.run().unwrap();

        let teardown = event_names(&sim, Phase::Teardown);
        assert_eq!(teardown.iter().filter(|n| *n == "update-status").count(), 1);
        assert_eq!(teardown.last().map(String::as_str), Some("remove"));
        assert!(!event_names(&sim, Phase::Setup).contains(&"update-status".to_string()));
    }

    #[test]
    fn test_operation_length() {
        let mut sim = quiet(SimulatorConfig {
            max_operation_length: 4,
            ..SimulatorConfig::demo()
        });
        sim.run().unwrap();
        assert_eq!(sim.scenario().actions(Phase::Operation).count(), 5);
    }

    #[test]
    fn test_phase_resets_after_run() {
        let mut sim = quiet(SimulatorConfig::default());
        assert_eq!(sim.current_phase(), None);
        sim.run().unwrap();
        assert_eq!(sim.current_phase(), None);
    }

    #[test]
    fn test_guard_sets_and_restores_phase() {
        let mut sim = quiet(SimulatorConfig::default());
        {
            let guard = sim.enter_phase(Phase::Setup).unwrap();
            assert_eq!(guard.current_phase(), Some(Phase::Setup));
            assert_eq!(guard.phase(), Phase::Setup);
        }
        assert_eq!(sim.current_phase(), None);
    }

    #[test]
    fn test_phases_cannot_be_reentered() {
        let mut sim = quiet(SimulatorConfig::default());
        sim.run().unwrap();
        assert!(matches!(sim.run(), Err(SimError::PhaseReentered(Phase::Setup))));

        sim.clear();
        assert!(sim.scenario().is_empty());
        sim.run().unwrap();
    }

    #[test]
    fn test_close_runs_when_body_fails() {
        let mut sim = quiet(SimulatorConfig::default());
        let result = {
            let mut guard = sim.enter_phase(Phase::Setup).unwrap();
            guard.queue(Event::install()).unwrap();
            let result = guard.exec(Relation::new("ghost").depart());
            result
        };
        assert!(matches!(result, Err(SimError::DepartUnknownRelation(_))));
        assert_eq!(sim.current_phase(), None);
        assert!(sim
            .scenario()
            .contains_event(Phase::Setup, &Container::new("workload").pebble_ready()));
    }
}
