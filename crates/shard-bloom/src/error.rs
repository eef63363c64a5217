//! Error types for the sharded Bloom filter

use thiserror::Error;

/// Errors that can occur while creating, restoring or querying a filter
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid filter parameter: {0}")]
    InvalidParameter(String),

    #[error("Filter already exists: {name}")]
    AlreadyExists { name: String },

    #[error("Filter not found: {name}")]
    NotFound { name: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Cannot restore filter {name}: {reason}")]
    Restore { name: String, reason: String },

    #[error("Hash generation exhausted after {attempts} attempts")]
    HashExhausted { attempts: u64 },

    #[error("Hash position {position} out of range for m={m}")]
    PositionOutOfRange { position: u64, m: u64 },
}

impl FilterError {
    pub(crate) fn restore(name: &str, reason: impl Into<String>) -> Self {
        FilterError::Restore {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors from the remote bitmap store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout")]
    Timeout,

    #[error("Command error: {0}")]
    Command(String),

    #[error("Key {key} holds a value of the wrong type")]
    WrongType { key: String },
}
