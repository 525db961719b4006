use async_trait::async_trait;

use super::EntityState;
use crate::DomainError;

/// Restore store for entity states across restarts.
///
/// Implementations live in the infrastructure layer.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Last persisted scalar state of an entity
    async fn last_state(&self, entity_id: &str) -> Result<Option<String>, DomainError>;

    /// Persist the given states, replacing earlier snapshots of the same entities
    async fn save_snapshot(&self, states: &[EntityState]) -> Result<(), DomainError>;
}

/// Sink for displayed entity states.
pub trait StateWriter: Send + Sync {
    fn write_state(&self, state: &EntityState);
}
