use crate::error::LookupError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, LookupError>;

/// The authoritative short code -> long URL lookup, consulted on a cache miss.
#[async_trait]
pub trait UrlLookup: Send + Sync + 'static {
    /// Returns the long URL for `code`, or `None` if no mapping exists.
    async fn lookup(&self, code: &ShortCode) -> Result<Option<String>>;
}

#[async_trait]
impl<T: UrlLookup + ?Sized> UrlLookup for Arc<T> {
    async fn lookup(&self, code: &ShortCode) -> Result<Option<String>> {
        (**self).lookup(code).await
    }
}
