//! Ordered record of what happened during one tick.

use serde::{Deserialize, Serialize};
use wator_core::{Action, Delta};

/// Append-only list of deltas, in the order creatures took their turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog(Vec<Delta>);

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delta: Delta) {
        self.0.push(delta);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Delta> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Delta] {
        &self.0
    }

    /// Deltas carrying the given action
    pub fn with_action(&self, action: Action) -> impl Iterator<Item = &Delta> + '_ {
        self.0.iter().filter(move |delta| delta.action == action)
    }

    pub fn count(&self, action: Action) -> usize {
        self.with_action(action).count()
    }

    pub fn into_vec(self) -> Vec<Delta> {
        self.0
    }
}

impl IntoIterator for ChangeLog {
    type Item = Delta;
    type IntoIter = std::vec::IntoIter<Delta>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeLog {
    type Item = &'a Delta;
    type IntoIter = std::slice::Iter<'a, Delta>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
