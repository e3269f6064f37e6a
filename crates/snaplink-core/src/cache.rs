use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, CacheError>;

/// A shared cache of short code -> long URL with per-entry expiry.
///
/// The cache never holds click counts. A miss (`Ok(None)`) only means the
/// entry is not cached; it says nothing about whether the code exists.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the long URL for `code` from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache or has expired.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Store the long URL for `code`. The entry must not be served after `ttl`.
    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()>;

    /// Remove the entry for `code`.
    ///
    /// It is not an error if the key does not exist.
    async fn del(&self, code: &ShortCode) -> Result<()>;
}

#[async_trait]
impl<T: UrlCache + ?Sized> UrlCache for Arc<T> {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        (**self).get_url(code).await
    }

    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        (**self).set_url(code, long_url, ttl).await
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        (**self).del(code).await
    }
}
