//! Wiring between configuration, transport and the satellite model.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use application::SatelliteManager;
use domain::{Capabilities, SatelliteDevice, SatelliteId};
use infrastructure::SatellitePublisher;
use infrastructure::config::SatelliteConfig;

/// Build the device model of a configured satellite, with its outbound
/// listeners attached.
pub fn build_device(
    config: &SatelliteConfig,
    publisher: &Arc<SatellitePublisher>,
) -> Result<SatelliteDevice> {
    let satellite_id = SatelliteId::new(config.satellite_id.as_str())
        .with_context(|| format!("Invalid satellite id in entry {}", config.entry_id))?;

    let mut device = SatelliteDevice::new(satellite_id, config.device_id());
    if let Some(capabilities) = &config.capabilities {
        device = device.with_capabilities(Capabilities::from_value(capabilities));
    }
    device.set_custom_action_listener(publisher.clone());
    device.set_custom_settings_listener(publisher.clone());
    Ok(device)
}

/// Set up every configured satellite. Returns the number set up.
///
/// An entry that cannot be set up is logged and skipped; the others still load.
pub async fn setup_satellites(
    manager: &SatelliteManager,
    satellites: &[SatelliteConfig],
    publisher: &Arc<SatellitePublisher>,
) -> usize {
    let mut ready = 0;
    for satellite in satellites {
        match setup_satellite(manager, satellite, publisher).await {
            Ok(entities) => {
                info!(
                    entry_id = %satellite.entry_id,
                    device_id = %satellite.device_id(),
                    entities,
                    "Satellite ready"
                );
                ready += 1;
            }
            Err(e) => warn!(
                entry_id = %satellite.entry_id,
                error = %e,
                "Skipping satellite that failed to set up"
            ),
        }
    }
    ready
}

async fn setup_satellite(
    manager: &SatelliteManager,
    satellite: &SatelliteConfig,
    publisher: &Arc<SatellitePublisher>,
) -> Result<usize> {
    let device = build_device(satellite, publisher)?;
    let entities = manager.setup_entry(&satellite.entry_id, device).await?;
    Ok(entities.len())
}
