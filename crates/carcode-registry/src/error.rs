//! Error types for the carcode registry

use std::time::Duration;

use carcode::{CodeError, RecordError};
use thiserror::Error;

use crate::storage::{FileStorageError, StoreError};

/// Registry-specific errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid vehicle record: {0}")]
    InvalidCandidate(#[from] RecordError),

    #[error("Registration number already exists: {0}")]
    DuplicateIdentifier(String),

    #[error("Code generation failed for {reg_no}: {source}")]
    CodeGenerationFailed {
        reg_no: String,
        #[source]
        source: GenerationError,
    },

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("IO failure: {0}")]
    IoFailure(FileStorageError),

    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Vehicle not found: {0}")]
    RecordNotFound(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl RegistryError {
    /// Whether the caller can fix the request and retry
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RegistryError::InvalidCandidate(_)
                | RegistryError::DuplicateIdentifier(_)
                | RegistryError::NotFound(_)
                | RegistryError::RecordNotFound(_)
        )
    }
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(reg_no) => RegistryError::DuplicateIdentifier(reg_no),
            other => RegistryError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<FileStorageError> for RegistryError {
    fn from(e: FileStorageError) -> Self {
        match e {
            FileStorageError::NotFound(name) => RegistryError::NotFound(name),
            other => RegistryError::IoFailure(other),
        }
    }
}

/// Why an artifact could not be produced
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Encode(#[from] CodeError),

    #[error("Failed to write artifact: {0}")]
    Write(#[from] FileStorageError),

    #[error("Artifact write timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
