use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use domain::entity::{EntityState, StateRepository, StateWriter};
use domain::SatelliteDevice;

use super::{DeviceRegistry, SatelliteEntities};
use crate::entity::EntityContext;
use crate::router::{Dispatcher, UpdateRouter};

/// Manages the lifecycle of configured satellites and their entities
pub struct SatelliteManager {
    registry: Arc<DeviceRegistry>,
    dispatcher: Arc<Dispatcher>,
    repository: Arc<dyn StateRepository>,
    writer: Arc<dyn StateWriter>,
    // entry_id -> adapters; the map owns the only strong references
    entities: Mutex<HashMap<String, Arc<SatelliteEntities>>>,
}

impl SatelliteManager {
    pub fn new(repository: Arc<dyn StateRepository>, writer: Arc<dyn StateWriter>) -> Self {
        Self {
            registry: Arc::new(DeviceRegistry::new()),
            dispatcher: Arc::new(Dispatcher::new()),
            repository,
            writer,
            entities: Mutex::new(HashMap::new()),
        }
    }

    /// Router delivering inbound updates to the entities managed here.
    pub fn router(&self) -> UpdateRouter {
        UpdateRouter::new(self.registry.clone(), self.dispatcher.clone())
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// Register a device, create its entities and run their startup.
    ///
    /// Setting up an entry that is already loaded unloads it first.
    pub async fn setup_entry(
        &self,
        entry_id: &str,
        device: SatelliteDevice,
    ) -> Result<Arc<SatelliteEntities>> {
        if self.entities.lock().await.contains_key(entry_id) {
            warn!(entry_id, "Entry already set up, reloading");
            self.unload_entry(entry_id).await?;
        }

        let device = Arc::new(device);
        self.registry.insert(entry_id, device.clone());

        let entities = Arc::new(SatelliteEntities::build(&device, self.writer.clone()));
        let ctx = EntityContext {
            repository: self.repository.clone(),
            dispatcher: self.dispatcher.clone(),
        };
        entities.added(&ctx).await;

        info!(
            entry_id,
            satellite_id = %device.satellite_id(),
            entities = entities.len(),
            "Satellite set up"
        );
        self.entities
            .lock()
            .await
            .insert(entry_id.to_string(), entities.clone());
        Ok(entities)
    }

    /// Persist the entry's entity states, then tear down its subscriptions.
    ///
    /// Returns `false` when the entry was not loaded.
    pub async fn unload_entry(&self, entry_id: &str) -> Result<bool> {
        let Some(entities) = self.entities.lock().await.remove(entry_id) else {
            return Ok(false);
        };

        let snapshot = entities.snapshot();
        let saved = self
            .repository
            .save_snapshot(&snapshot)
            .await
            .with_context(|| format!("Failed to save snapshot for entry {entry_id}"));

        if let Some(device) = self.registry.remove(entry_id) {
            self.dispatcher.disconnect_device(device.device_id());
            device.clear_listeners();
            info!(entry_id, satellite_id = %device.satellite_id(), "Satellite unloaded");
        }

        saved.map(|()| true)
    }

    /// Persist the state of every loaded entity.
    pub async fn snapshot_all(&self) -> Result<usize> {
        let states: Vec<EntityState> = self
            .entities
            .lock()
            .await
            .values()
            .flat_map(|entities| entities.snapshot())
            .collect();

        self.repository
            .save_snapshot(&states)
            .await
            .context("Failed to save entity snapshot")?;
        Ok(states.len())
    }

    pub async fn entities(&self, entry_id: &str) -> Option<Arc<SatelliteEntities>> {
        self.entities.lock().await.get(entry_id).cloned()
    }

    pub async fn entry_ids(&self) -> Vec<String> {
        self.entities.lock().await.keys().cloned().collect()
    }
}
