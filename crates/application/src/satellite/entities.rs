use std::sync::Arc;

use domain::entity::{EntityState, Platform, StateWriter};
use domain::SatelliteDevice;

use crate::entity::catalog::{self, CatalogEntry};
use crate::entity::{
    ButtonAdapter, EntityContext, SatelliteEntity, SelectAdapter, SensorAdapter, SwitchAdapter,
};

/// Every entity adapter created for one satellite.
pub struct SatelliteEntities {
    sensors: Vec<Arc<SensorAdapter>>,
    switches: Vec<Arc<SwitchAdapter>>,
    selects: Vec<Arc<SelectAdapter>>,
    buttons: Vec<Arc<ButtonAdapter>>,
}

impl SatelliteEntities {
    /// Create the adapters the device's current capabilities call for.
    pub fn build(device: &Arc<SatelliteDevice>, writer: Arc<dyn StateWriter>) -> Self {
        let mut entities = Self {
            sensors: Vec::new(),
            switches: Vec::new(),
            selects: Vec::new(),
            buttons: Vec::new(),
        };

        for entry in catalog::catalog(&device.capabilities()) {
            let device = device.clone();
            let writer = writer.clone();
            match entry {
                CatalogEntry::Sensor(description) => entities
                    .sensors
                    .push(Arc::new(SensorAdapter::new(description, device, writer))),
                CatalogEntry::Switch(description, target) => entities
                    .switches
                    .push(Arc::new(SwitchAdapter::new(description, target, device, writer))),
                CatalogEntry::Select(description, options, encoding) => {
                    entities.selects.push(Arc::new(SelectAdapter::new(
                        description,
                        options,
                        encoding,
                        device,
                        writer,
                    )))
                }
                CatalogEntry::Button(description, action) => entities
                    .buttons
                    .push(Arc::new(ButtonAdapter::new(description, action, device, writer))),
            }
        }
        entities
    }

    pub fn all(&self) -> Vec<Arc<dyn SatelliteEntity>> {
        let mut all: Vec<Arc<dyn SatelliteEntity>> = Vec::new();
        all.extend(self.sensors.iter().map(|e| e.clone() as Arc<dyn SatelliteEntity>));
        all.extend(self.switches.iter().map(|e| e.clone() as Arc<dyn SatelliteEntity>));
        all.extend(self.selects.iter().map(|e| e.clone() as Arc<dyn SatelliteEntity>));
        all.extend(self.buttons.iter().map(|e| e.clone() as Arc<dyn SatelliteEntity>));
        all
    }

    /// Run every adapter's startup, in catalog order.
    pub async fn added(&self, ctx: &EntityContext) {
        for entity in self.all() {
            entity.added(ctx).await;
        }
    }

    /// Current state of every restorable entity.
    pub fn snapshot(&self) -> Vec<EntityState> {
        self.all()
            .iter()
            .filter(|entity| entity.description().restore)
            .map(|entity| entity.state())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sensors.len() + self.switches.len() + self.selects.len() + self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sensor(&self, key: &str) -> Option<&Arc<SensorAdapter>> {
        self.find_sensor(Platform::Sensor, key)
    }

    pub fn binary_sensor(&self, key: &str) -> Option<&Arc<SensorAdapter>> {
        self.find_sensor(Platform::BinarySensor, key)
    }

    fn find_sensor(&self, platform: Platform, key: &str) -> Option<&Arc<SensorAdapter>> {
        self.sensors
            .iter()
            .find(|s| s.key() == key && s.description().platform == platform)
    }

    pub fn switch(&self, key: &str) -> Option<&Arc<SwitchAdapter>> {
        self.switches.iter().find(|s| s.key() == key)
    }

    pub fn select(&self, key: &str) -> Option<&Arc<SelectAdapter>> {
        self.selects.iter().find(|s| s.key() == key)
    }

    pub fn button(&self, key: &str) -> Option<&Arc<ButtonAdapter>> {
        self.buttons.iter().find(|b| b.key() == key)
    }
}
