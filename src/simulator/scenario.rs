//! The produced trace and its presentation

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::Phase;
use crate::model::{Action, Event};

/// One record of the trace
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Event(Event),
    Action(Action),
}

impl Step {
    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Step::Event(event) => Some(event),
            Step::Action(_) => None,
        }
    }

    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Step::Action(action) => Some(action),
            Step::Event(_) => None,
        }
    }
}

impl From<Event> for Step {
    fn from(event: Event) -> Self {
        Step::Event(event)
    }
}

impl From<Action> for Step {
    fn from(action: Action) -> Self {
        Step::Action(action)
    }
}

/// Ordered trace per phase; insertion order is the output
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub setup: Vec<Step>,
    pub operation: Vec<Step>,
    pub teardown: Vec<Step>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self, phase: Phase) -> &[Step] {
        match phase {
            Phase::Setup => &self.setup,
            Phase::Operation => &self.operation,
            Phase::Teardown => &self.teardown,
        }
    }

    pub fn phase_mut(&mut self, phase: Phase) -> &mut Vec<Step> {
        match phase {
            Phase::Setup => &mut self.setup,
            Phase::Operation => &mut self.operation,
            Phase::Teardown => &mut self.teardown,
        }
    }

    pub fn events(&self, phase: Phase) -> impl Iterator<Item = &Event> {
        self.phase(phase).iter().filter_map(Step::as_event)
    }

    pub fn actions(&self, phase: Phase) -> impl Iterator<Item = &Action> {
        self.phase(phase).iter().filter_map(Step::as_action)
    }

    pub fn contains_event(&self, phase: Phase, event: &Event) -> bool {
        self.events(phase).any(|e| e == event)
    }

    pub fn is_empty(&self) -> bool {
        Phase::ALL.iter().all(|&p| self.phase(p).is_empty())
    }

    pub fn len(&self) -> usize {
        Phase::ALL.iter().map(|&p| self.phase(p).len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Index<Phase> for Scenario {
    type Output = [Step];

    fn index(&self, phase: Phase) -> &[Step] {
        self.phase(phase)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "simulation:")?;
        for phase in Phase::ALL {
            writeln!(f, "PHASE {}:", phase)?;
            for step in self.phase(phase) {
                match step {
                    Step::Event(event) => writeln!(f, "    Event  :: {}", event)?,
                    Step::Action(action) => writeln!(f, "    Action :: {}", action)?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "end.")
    }
}
