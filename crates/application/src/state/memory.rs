use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use domain::entity::{EntityState, StateRepository, StateWriter};
use domain::DomainError;

/// Restore store and display-state sink kept in memory.
///
/// Displayed states and persisted states are tracked separately: writes only
/// change what is displayed, a snapshot is what a later restore will see.
#[derive(Default)]
pub struct InMemoryStateStore {
    displayed: RwLock<HashMap<String, EntityState>>,
    persisted: RwLock<HashMap<String, String>>,
    writes: RwLock<Vec<EntityState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a persisted state, as if saved by an earlier run.
    pub fn seed(&self, entity_id: impl Into<String>, state: impl Into<String>) {
        self.persisted.write().insert(entity_id.into(), state.into());
    }

    /// Currently displayed state of an entity.
    pub fn current(&self, entity_id: &str) -> Option<EntityState> {
        self.displayed.read().get(entity_id).cloned()
    }

    pub fn persisted(&self, entity_id: &str) -> Option<String> {
        self.persisted.read().get(entity_id).cloned()
    }

    /// Every state written so far, oldest first.
    pub fn writes(&self) -> Vec<EntityState> {
        self.writes.read().clone()
    }

    pub fn writes_for(&self, entity_id: &str) -> Vec<EntityState> {
        self.writes
            .read()
            .iter()
            .filter(|state| state.entity_id == entity_id)
            .cloned()
            .collect()
    }
}

impl StateWriter for InMemoryStateStore {
    fn write_state(&self, state: &EntityState) {
        self.displayed
            .write()
            .insert(state.entity_id.clone(), state.clone());
        self.writes.write().push(state.clone());
    }
}

#[async_trait]
impl StateRepository for InMemoryStateStore {
    async fn last_state(&self, entity_id: &str) -> Result<Option<String>, DomainError> {
        Ok(self.persisted(entity_id))
    }

    async fn save_snapshot(&self, states: &[EntityState]) -> Result<(), DomainError> {
        let mut persisted = self.persisted.write();
        for state in states {
            persisted.insert(state.entity_id.clone(), state.persisted_value());
        }
        Ok(())
    }
}
