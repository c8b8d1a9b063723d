//! Action execution engine
//!
//! Dispatches an action on its subject type and name, mutates the simulator
//! state, and emits the resulting events. Actions are consumed (removed from
//! the legal pool) after execution unless the dispatch says otherwise.

use crate::core::error::{Result, SimError};
use crate::model::{Action, Event, Relation, StorageMount, Subject};
use crate::simulator::scenario::Step;
use crate::simulator::CharmEventSimulator;

impl CharmEventSimulator {
    /// Execute `action` in the current phase
    pub fn exec(&mut self, action: Action) -> Result<()> {
        let phase = self.current_phase.ok_or(SimError::NoActivePhase)?;
        tracing::info!("processing {}", action);
        self.scenario.phase_mut(phase).push(Step::Action(action.clone()));

        let consume = match &action.subject {
            Subject::Relation(name) => self.exec_relation(name, &action)?,
            Subject::Storage(name) => self.exec_storage(name, &action)?,
            Subject::Global => self.exec_global(&action)?,
        };

        if consume {
            self.possible_actions.consume(&action);
        }

        tracing::info!("processed {}", action);
        Ok(())
    }

    fn exec_relation(&mut self, name: &str, action: &Action) -> Result<bool> {
        match action.name.as_str() {
            Relation::CHANGE => {
                let relation = self.known_relation(name)?;
                self.queue(relation.changed())?;
                // databags can be touched any number of times
                Ok(false)
            }

            Relation::CREATE => {
                let mut relation = self.known_relation(name)?;
                relation.is_joined = false;
                self.queue(relation.created())?;

                let change = relation.change(&mut self.rng);
                self.possible_actions.insert(change);
                self.possible_actions.insert(relation.join());
                if !relation.is_peer {
                    self.possible_actions.insert(relation.destroy());
                }
                self.add_relation(relation);
                Ok(true)
            }

            Relation::JOIN => {
                let index = self
                    .relation_index(name)
                    .ok_or_else(|| SimError::JoinUnknownRelation(name.to_string()))?;
                if self.relations[index].is_joined {
                    return Err(SimError::RejoinRelation(name.to_string()));
                }

                let relation = self.relations[index].clone();
                // joined and IMMEDIATELY after, changed
                self.queue_isolated(relation.joined())?;
                self.queue_isolated(relation.changed())?;
                self.relations[index].is_joined = true;

                self.possible_actions.insert(relation.depart());
                Ok(true)
            }

            Relation::DESTROY => {
                let relation = self
                    .remove_relation(name)
                    .ok_or_else(|| SimError::UnknownRelation(name.to_string()))?;
                self.queue(relation.broken())?;

                self.possible_actions.retire(
                    &relation.subject(),
                    &[Relation::CHANGE, Relation::JOIN, Relation::DEPART],
                );
                if self.potential_relations.contains(&relation) {
                    self.possible_actions.insert(relation.create());
                }
                Ok(true)
            }

            Relation::DEPART => {
                let index = self
                    .relation_index(name)
                    .ok_or_else(|| SimError::DepartUnknownRelation(name.to_string()))?;
                if !self.relations[index].is_joined {
                    return Err(SimError::DepartNotJoined(name.to_string()));
                }

                self.relations[index].is_joined = false;
                let relation = self.relations[index].clone();
                self.queue(relation.departed())?;

                self.possible_actions.insert(relation.join());
                Ok(true)
            }

            _ => Err(unrecognized(action)),
        }
    }

    fn exec_storage(&mut self, name: &str, action: &Action) -> Result<bool> {
        let storage = StorageMount::new(name);
        match action.name.as_str() {
            StorageMount::ATTACH => {
                if !self.is_known_storage(name) {
                    return Err(SimError::UnknownStorage(name.to_string()));
                }
                if self.has_storage(name) {
                    return Err(SimError::ReattachStorage(name.to_string()));
                }
                self.attach_storage(storage.clone());
                self.queue(storage.attached())?;
                self.possible_actions.insert(storage.detach());
                Ok(true)
            }

            StorageMount::DETACH => {
                if !self.has_storage(name) {
                    return Err(SimError::DetachUnknownStorage(name.to_string()));
                }
                self.detach_storage(name);
                self.queue(storage.detached())?;
                if self.potential_storage_mounts.contains(&storage) {
                    self.possible_actions.insert(storage.attach());
                }
                Ok(true)
            }

            _ => Err(unrecognized(action)),
        }
    }

    /// Generic actions; only a floor-hitting scale-down is ever consumed
    fn exec_global(&mut self, action: &Action) -> Result<bool> {
        match action.name.as_str() {
            Action::CONFIG_CHANGE => {
                self.queue(Event::config_changed())?;
                Ok(false)
            }

            Action::SCALE_UP => {
                let joined = self.joined_relations();
                if joined.is_empty() {
                    tracing::debug!("no joined relations: scale+ will trigger no events");
                }
                for relation in joined {
                    self.scale += 1;
                    // we can definitely scale down now
                    self.possible_actions.insert(Action::scale_down());

                    self.queue_isolated(relation.joined())?;
                    self.queue_isolated(relation.changed())?;
                }
                Ok(false)
            }

            Action::SCALE_DOWN => {
                let joined = self.joined_relations();
                if joined.is_empty() {
                    tracing::debug!("no joined relations: scale- will trigger no events");
                }
                let mut consume = false;
                for relation in joined {
                    if self.scale == 1 {
                        // can't scale down any further
                        consume = true;
                    } else {
                        self.scale -= 1;
                    }
                    self.queue(relation.departed())?;
                }
                Ok(consume)
            }

            Action::LEADERSHIP_CHANGE => {
                self.is_leader = !self.is_leader;
                if self.is_leader {
                    self.queue(Event::leader_elected())?;
                } else {
                    self.queue(Event::leader_settings_changed())?;
                }
                Ok(false)
            }

            _ => Err(unrecognized(action)),
        }
    }
}

fn unrecognized(action: &Action) -> SimError {
    SimError::UnrecognizedAction {
        subject_kind: action.subject.kind(),
        name: action.name.clone(),
    }
}
