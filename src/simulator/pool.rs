//! Registry of currently legal actions

use std::collections::BTreeMap;

use rand::Rng;

use crate::model::{Action, ActionKey, Subject};

/// Pool of actions that may legally happen next.
///
/// Entries are keyed by `ActionKey`, so membership is decided by logical
/// identity and iteration order is stable for a given content.
#[derive(Debug, Clone, Default)]
pub struct ActionPool {
    legal: BTreeMap<ActionKey, Action>,
}

impl ActionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `action` legal. Returns false if it already was.
    pub fn insert(&mut self, action: Action) -> bool {
        let key = action.key();
        if self.legal.contains_key(&key) {
            return false;
        }
        self.legal.insert(key, action);
        true
    }

    /// Remove an executed action. Returns false if it was not legal.
    pub fn consume(&mut self, action: &Action) -> bool {
        self.legal.remove(&action.key()).is_some()
    }

    pub fn contains(&self, action: &Action) -> bool {
        self.legal.contains_key(&action.key())
    }

    /// Whether any action called `name` on `subject` is legal, whatever its source
    pub fn allows(&self, subject: &Subject, name: &str) -> bool {
        self.legal
            .keys()
            .any(|k| &k.subject == subject && k.name == name)
    }

    /// Retire every action on `subject` whose name is in `names`
    pub fn retire(&mut self, subject: &Subject, names: &[&str]) {
        self.legal
            .retain(|k, _| !(&k.subject == subject && names.contains(&k.name.as_str())));
    }

    /// Uniform draw over the legal actions
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Action> {
        if self.legal.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.legal.len());
        self.legal.values().nth(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.legal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legal.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.legal.values()
    }
}

impl FromIterator<Action> for ActionPool {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut pool = Self::new();
        for action in iter {
            pool.insert(action);
        }
        pool
    }
}
