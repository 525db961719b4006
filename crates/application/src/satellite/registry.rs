use dashmap::DashMap;
use std::sync::Arc;

use domain::SatelliteDevice;

/// Device models of the configured satellites, keyed by config entry id.
///
/// Entries are added at setup and removed at unload; a secondary index
/// resolves the transport's device id to the entry.
#[derive(Default)]
pub struct DeviceRegistry {
    entries: DashMap<String, Arc<SatelliteDevice>>,
    by_device: DashMap<String, String>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device for an entry, returning the device it replaced.
    pub fn insert(
        &self,
        entry_id: impl Into<String>,
        device: Arc<SatelliteDevice>,
    ) -> Option<Arc<SatelliteDevice>> {
        let entry_id = entry_id.into();
        self.by_device
            .insert(device.device_id().to_string(), entry_id.clone());
        let previous = self.entries.insert(entry_id, device);
        if let Some(previous) = &previous {
            self.drop_device_index(previous.device_id());
        }
        previous
    }

    pub fn get(&self, entry_id: &str) -> Option<Arc<SatelliteDevice>> {
        self.entries.get(entry_id).map(|entry| entry.value().clone())
    }

    pub fn find_by_device_id(&self, device_id: &str) -> Option<Arc<SatelliteDevice>> {
        let entry_id = self.by_device.get(device_id)?.value().clone();
        self.get(&entry_id)
    }

    pub fn remove(&self, entry_id: &str) -> Option<Arc<SatelliteDevice>> {
        let (_, device) = self.entries.remove(entry_id)?;
        self.drop_device_index(device.device_id());
        Some(device)
    }

    pub fn entry_ids(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Keep the index entry while its entry still holds a device with that id.
    fn drop_device_index(&self, device_id: &str) {
        self.by_device.remove_if(device_id, |_, entry_id| {
            self.entries
                .get(entry_id)
                .is_none_or(|device| device.device_id() != device_id)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::SatelliteId;

    fn device(satellite: &str, device_id: &str) -> Arc<SatelliteDevice> {
        Arc::new(SatelliteDevice::new(
            SatelliteId::new(satellite).unwrap(),
            device_id,
        ))
    }

    #[test]
    fn test_insert_and_lookup() {
        let registry = DeviceRegistry::new();
        registry.insert("entry-1", device("vaca-1", "dev-1"));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("entry-1").unwrap().satellite_id().as_str(),
            "vaca-1"
        );
        assert_eq!(
            registry.find_by_device_id("dev-1").unwrap().satellite_id().as_str(),
            "vaca-1"
        );
        assert!(registry.find_by_device_id("dev-2").is_none());
    }

    #[test]
    fn test_remove_clears_device_index() {
        let registry = DeviceRegistry::new();
        registry.insert("entry-1", device("vaca-1", "dev-1"));

        assert!(registry.remove("entry-1").is_some());
        assert!(registry.find_by_device_id("dev-1").is_none());
        assert!(registry.is_empty());
        assert!(registry.remove("entry-1").is_none());
    }

    #[test]
    fn test_reinsert_same_entry_replaces_device() {
        let registry = DeviceRegistry::new();
        registry.insert("entry-1", device("vaca-1", "dev-1"));
        let previous = registry.insert("entry-1", device("vaca-1", "dev-9"));

        assert_eq!(previous.unwrap().device_id(), "dev-1");
        assert!(registry.find_by_device_id("dev-1").is_none());
        assert!(registry.find_by_device_id("dev-9").is_some());
    }
}
