use thiserror::Error;

/// Error de validación del modelo de parámetros.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    ValidationError(String),
    #[error("unknown provisioning action: {0}")]
    UnknownAction(String),
    #[error("malformed checksum for {field}: {reason}")]
    MalformedChecksum { field: &'static str, reason: String },
}

