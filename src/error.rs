// Error types for the task list and its storage backends

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Persisted task data was present but could not be parsed
    #[error("Failed to parse stored data under key '{key}': {source}")]
    LoadParse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The durable store rejected a write
    #[error("Failed to write key '{key}': {reason}")]
    PersistWrite { key: String, reason: String },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
