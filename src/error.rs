use bincode::Error as BincodeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VesperError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Bincode serialization error: {0}")]
    Bincode(#[from] BincodeError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),
}

/// Reasons a document can fail schema validation. Raised before any write
/// is issued, so a failed save leaves the store untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field '{0}' is missing")]
    MissingField(String),

    #[error("required field '{0}' is empty")]
    EmptyField(String),

    #[error("field '{field}' is {len} characters long, maximum is {max}")]
    TooLong {
        field: String,
        len: usize,
        max: usize,
    },

    #[error("field '{field}' expected {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{0}' is not declared in the schema")]
    UnknownField(String),
}

pub type Result<T> = std::result::Result<T, VesperError>;
