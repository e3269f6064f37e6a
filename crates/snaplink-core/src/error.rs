use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Errors reported by a [`MappingStore`](crate::MappingStore).
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The store's unique constraint on `code` rejected the write.
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache serialization failed: {0}")]
    Serialization(String),
    #[error("cache value is invalid: {0}")]
    InvalidData(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum QueueError {
    #[error("queue backend unavailable: {0}")]
    Unavailable(String),
    #[error("queue operation timed out: {0}")]
    Timeout(String),
    #[error("queue payload serialization failed: {0}")]
    Serialization(String),
    #[error("queue operation failed: {0}")]
    Operation(String),
}

/// Errors reported by an authoritative [`UrlLookup`](crate::UrlLookup).
///
/// Absence is not an error; lookups report it as `Ok(None)`.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("lookup backend unavailable: {0}")]
    Unavailable(String),
    #[error("lookup timed out: {0}")]
    Timeout(String),
    #[error("lookup returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl From<StorageError> for LookupError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Timeout(message) => Self::Timeout(message),
            StorageError::InvalidData(message) => Self::InvalidResponse(message),
            other => Self::Unavailable(other.to_string()),
        }
    }
}
