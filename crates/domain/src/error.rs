use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid satellite ID: {0}")]
    InvalidSatelliteId(String),

    #[error("Invalid option '{option}' for {entity_id}")]
    InvalidOption { entity_id: String, option: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
