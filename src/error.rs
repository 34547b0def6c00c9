use thiserror::Error;

/// Failure reading or writing a durable storage entry.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// Failure encoding or decoding a persisted state envelope.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bitcode codec error: {0}")]
    Bitcode(#[from] bitcode::Error),
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Anything that can go wrong while persisting or rehydrating state.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("persisted state version {found} does not match expected {expected}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// The bulk-load source failed to produce a data set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("initial data fetch failed: {0}")]
pub struct FetchError(pub String);

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
