use snaplink_core::StorageError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// Every candidate drawn within the attempt cap was already taken.
    ///
    /// With a sane namespace this should never happen; treat it as a sign the
    /// generator settings are too small for the data set.
    #[error("no unused short code found after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ShortenerError {
    /// Whether the failure is a transient backend problem worth retrying later.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Storage(StorageError::Unavailable(_) | StorageError::Timeout(_))
        )
    }
}
