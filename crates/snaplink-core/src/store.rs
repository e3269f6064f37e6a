use crate::error::StorageError;
use crate::mapping::Mapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::sync::Arc;

/// Result type for mapping store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// The persistent, authoritative record of short code -> long URL and click count.
#[async_trait]
pub trait MappingStore: Send + Sync + 'static {
    /// Inserts a new mapping with a zero click count.
    ///
    /// Returns `Err(StorageError::Conflict)` if the code already exists. This is
    /// the point where code uniqueness is actually enforced.
    async fn create(&self, code: &ShortCode, long_url: &str, owner_ref: &str) -> Result<Mapping>;

    /// Checks whether a short code is already taken.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;

    /// Retrieves the mapping for a given short code.
    /// Returns `None` if the code does not exist.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>>;

    /// Atomically adds one to the click count of `code`.
    ///
    /// Returns `Err(StorageError::NotFound)` if the code does not exist.
    async fn increment_count(&self, code: &ShortCode) -> Result<()>;

    /// Lists every mapping created by `owner_ref`, newest first.
    async fn list_by_owner(&self, owner_ref: &str) -> Result<Vec<Mapping>>;
}

#[async_trait]
impl<T: MappingStore + ?Sized> MappingStore for Arc<T> {
    async fn create(&self, code: &ShortCode, long_url: &str, owner_ref: &str) -> Result<Mapping> {
        (**self).create(code, long_url, owner_ref).await
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        (**self).exists(code).await
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        (**self).find_by_code(code).await
    }

    async fn increment_count(&self, code: &ShortCode) -> Result<()> {
        (**self).increment_count(code).await
    }

    async fn list_by_owner(&self, owner_ref: &str) -> Result<Vec<Mapping>> {
        (**self).list_by_owner(owner_ref).await
    }
}
