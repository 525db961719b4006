use crate::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Identifier a satellite announces itself with.
///
/// Any non-empty string is accepted (host:port pairs included); entity ids
/// derived from it are slugged separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SatelliteId(String);

impl SatelliteId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidSatelliteId(
                "Satellite ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SatelliteId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SatelliteId> for String {
    fn from(id: SatelliteId) -> Self {
        id.0
    }
}

impl std::fmt::Display for SatelliteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_satellite_id() {
        let id = SatelliteId::new("vaca-1234").unwrap();
        assert_eq!(id.as_str(), "vaca-1234");
    }

    #[test]
    fn test_satellite_id_with_dot() {
        let id = SatelliteId::new("kitchen.tablet_01").unwrap();
        assert_eq!(id.to_string(), "kitchen.tablet_01");
    }

    #[test]
    fn test_empty_satellite_id() {
        let result = SatelliteId::new("");
        assert_eq!(
            result.unwrap_err(),
            DomainError::InvalidSatelliteId("Satellite ID cannot be empty".to_string())
        );
    }

    #[test]
    fn test_blank_satellite_id() {
        assert!(SatelliteId::new("   ").is_err());
    }

    #[test]
    fn test_host_port_satellite_id_is_accepted() {
        let id = SatelliteId::new("192.168.1.20:10700").unwrap();
        assert_eq!(id.as_str(), "192.168.1.20:10700");
    }

    #[test]
    fn test_satellite_id_deserialization_validates() {
        let ok: SatelliteId = serde_json::from_str("\"vaca-1\"").unwrap();
        assert_eq!(ok.as_str(), "vaca-1");
        assert!(serde_json::from_str::<SatelliteId>("\"\"").is_err());
    }
}
