//! Event queue and background-event injector

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::error::{Result, SimError};
use crate::core::types::BackgroundKind;
use crate::model::Event;
use crate::simulator::scenario::Step;
use crate::simulator::CharmEventSimulator;

/// Insert `step` at a random index in `0..len` (0 when empty).
///
/// The last position is never drawn, so whatever closed the sequence stays last.
pub fn random_insert<R: Rng + ?Sized>(steps: &mut Vec<Step>, step: Step, rng: &mut R) {
    let index = if steps.is_empty() {
        0
    } else {
        rng.gen_range(0..steps.len())
    };
    steps.insert(index, step);
}

/// Like `random_insert`, but never lands between a relation's `joined`
/// event and the `changed` event that immediately follows it.
pub fn random_insert_keeping_pairs<R: Rng + ?Sized>(steps: &mut Vec<Step>, step: Step, rng: &mut R) {
    let candidates: Vec<usize> = (0..steps.len().max(1))
        .filter(|&i| i == 0 || !splits_join_pair(steps, i))
        .collect();
    let index = *candidates.choose(rng).unwrap_or(&0);
    steps.insert(index, step);
}

/// Whether inserting at `index` would separate a `joined`/`changed` pair
fn splits_join_pair(steps: &[Step], index: usize) -> bool {
    let before = steps.get(index.wrapping_sub(1)).and_then(Step::as_event);
    let after = steps.get(index).and_then(Step::as_event);
    match (before, after) {
        (Some(before), Some(after)) => {
            before.joined_relation().is_some() && before.joined_relation() == after.changed_relation()
        }
        _ => false,
    }
}

impl CharmEventSimulator {
    /// Queue `event` with every background kind eligible for injection
    pub(crate) fn queue(&mut self, event: Event) -> Result<()> {
        self.queue_with(event, &BackgroundKind::ALL, &[])
    }

    /// Queue `event` with injection disabled, so nothing can land next to it
    pub(crate) fn queue_isolated(&mut self, event: Event) -> Result<()> {
        self.queue_with(event, &[], &[])
    }

    /// Queue `event` into the current phase, possibly surrounded by
    /// background events of the `allow`ed kinds not listed in `disallow`.
    pub fn queue_with(
        &mut self,
        event: Event,
        allow: &[BackgroundKind],
        disallow: &[BackgroundKind],
    ) -> Result<()> {
        let phase = self.current_phase.ok_or(SimError::NoActivePhase)?;

        let mut sequence = vec![Step::Event(event.clone())];
        for &kind in allow {
            if disallow.contains(&kind) {
                continue;
            }

            let chance = self.chances.get(phase, kind);
            if chance <= 0.0 || self.rng.gen::<f64>() >= chance {
                continue;
            }

            match kind {
                BackgroundKind::ContainerReady => {
                    if !self.platform.has_pebble() {
                        continue;
                    }
                    // determine which container is getting ready
                    let Some(container) = self.containers.choose(&mut self.rng) else {
                        continue;
                    };
                    let ready = container.pebble_ready();
                    random_insert(&mut sequence, Step::Event(ready), &mut self.rng);
                }
                BackgroundKind::StatusUpdate => {
                    random_insert(&mut sequence, Step::Event(Event::update_status()), &mut self.rng);
                }
            }
            tracing::debug!("chance ({}) inserted {} >> {}", chance, kind, phase);
        }

        tracing::info!(%phase, event = %event, "queued");
        self.scenario.phase_mut(phase).extend(sequence);
        Ok(())
    }
}
