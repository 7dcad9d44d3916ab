use std::collections::HashSet;

use crate::CheckId;

/// Checks already reported during the current session.
///
/// Purely an in-memory fast path: the event files on disk remain the record
/// of what the coordinator has been told, so losing this set on restart
/// only costs a redundant existence check.
#[derive(Debug, Default, Clone)]
pub struct CompletedChecks {
    ids: HashSet<CheckId>,
}

impl CompletedChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the id was not already present.
    pub fn add(&mut self, id: CheckId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &CheckId) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
