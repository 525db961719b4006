use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use domain::entity::{EntityDescription, EntityState, StateWriter};
use domain::{CustomAction, SatelliteDevice};

use super::{EntityContext, EntityCore, SatelliteEntity};

/// Stateless entity: every press fires one custom action.
pub struct ButtonAdapter {
    core: EntityCore,
    action: CustomAction,
}

impl ButtonAdapter {
    pub fn new(
        description: EntityDescription,
        action: CustomAction,
        device: Arc<SatelliteDevice>,
        writer: Arc<dyn StateWriter>,
    ) -> Self {
        Self {
            core: EntityCore::new(description, device, writer),
            action,
        }
    }

    pub fn key(&self) -> &str {
        self.core.key()
    }

    pub fn action(&self) -> CustomAction {
        self.action
    }

    pub fn press(&self) {
        debug!(entity_id = %self.core.entity_id(), action = %self.action, "Button pressed");
        self.core.device().send_custom_action(self.action, None);
    }
}

#[async_trait]
impl SatelliteEntity for ButtonAdapter {
    fn description(&self) -> &EntityDescription {
        self.core.description()
    }

    fn entity_id(&self) -> &str {
        self.core.entity_id()
    }

    fn state(&self) -> EntityState {
        self.core.state()
    }

    async fn added(self: Arc<Self>, _ctx: &EntityContext) {}
}
