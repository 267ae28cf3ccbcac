//! # Domain Errors
//!
//! Error types for the aval registry.
//!
//! ## Design Principles
//!
//! - Each request-facing variant maps to one rejection the caller can act on
//! - Storage-class variants are opaque to callers and never retried
//! - No panics in domain logic (use Result instead)

use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvalError {
    /// Missing, blank or malformed payload values.
    #[error("{message}: {}", .fields.join(", "))]
    ValidationError {
        message: &'static str,
        fields: Vec<String>,
    },

    /// No record with this surrogate id.
    #[error("Aval not found: id {id}")]
    NotFound { id: u64 },

    /// Identity or lifecycle field submitted through the edit path.
    #[error("Field cannot be edited: {field}")]
    ForbiddenField { field: String },

    /// Edit attempted on a voided record.
    #[error("Aval {correlativo} is voided and can no longer be edited")]
    Immutable { correlativo: String },

    /// Void attempted on a record that is already voided.
    #[error("Aval {correlativo} was already voided")]
    AlreadyVoided { correlativo: String },

    /// Counter namespace was never provisioned.
    #[error("Unknown sequence: {name}")]
    UnknownSequence { name: String },

    /// Formatter called with a non-positive sequence number.
    #[error("Invalid sequence number: {value}")]
    InvalidSequenceNumber { value: u64 },

    /// Counter cannot advance any further.
    #[error("Sequence {name} exhausted at {last_value}")]
    SequenceExhausted { name: String, last_value: u64 },

    /// Correlativo already present in the uniqueness index.
    #[error("Correlativo already issued: {correlativo}")]
    DuplicateCorrelativo { correlativo: String },

    /// Checksum mismatch on a stored record.
    #[error("Data corruption detected for aval {id}: expected checksum {expected}, got {actual}")]
    DataCorruption { id: u64, expected: u32, actual: u32 },

    /// Database I/O error.
    #[error("Database error: {message}")]
    DatabaseError { message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl AvalError {
    /// Validation failure naming the offending fields.
    pub fn validation<I, S>(message: &'static str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AvalError::ValidationError {
            message,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// True for the request-facing taxonomy a caller can correct or act on.
    ///
    /// Everything else is a storage or configuration failure and is surfaced
    /// to callers as an opaque error.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AvalError::ValidationError { .. }
                | AvalError::NotFound { .. }
                | AvalError::ForbiddenField { .. }
                | AvalError::Immutable { .. }
                | AvalError::AlreadyVoided { .. }
        )
    }

    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            AvalError::ValidationError { .. } => "ValidationError",
            AvalError::NotFound { .. } => "NotFound",
            AvalError::ForbiddenField { .. } => "ForbiddenField",
            AvalError::Immutable { .. } => "Immutable",
            AvalError::AlreadyVoided { .. } => "AlreadyVoided",
            AvalError::UnknownSequence { .. } => "UnknownSequence",
            AvalError::InvalidSequenceNumber { .. } => "InvalidSequenceNumber",
            AvalError::SequenceExhausted { .. } => "SequenceExhausted",
            AvalError::DuplicateCorrelativo { .. } => "DuplicateCorrelativo",
            AvalError::DataCorruption { .. } => "DataCorruption",
            AvalError::DatabaseError { .. } => "DatabaseError",
            AvalError::SerializationError { .. } => "SerializationError",
        }
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },
    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

impl From<KVStoreError> for AvalError {
    fn from(err: KVStoreError) -> Self {
        AvalError::DatabaseError {
            message: err.to_string(),
        }
    }
}

/// Serialization errors.
#[derive(Debug, Clone, Error)]
#[error("Serialization error: {message}")]
pub struct SerializationError {
    pub message: String,
}

impl From<SerializationError> for AvalError {
    fn from(err: SerializationError) -> Self {
        AvalError::SerializationError {
            message: err.message,
        }
    }
}
