use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The authoritative lookup has no mapping for the code.
    #[error("short code not found")]
    NotFound,
    /// The code could not be resolved right now. Says nothing about existence.
    #[error("resolution unavailable: {0}")]
    Unavailable(String),
}
