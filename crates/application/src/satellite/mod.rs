mod entities;
mod manager;
mod registry;

pub use entities::SatelliteEntities;
pub use manager::SatelliteManager;
pub use registry::DeviceRegistry;
