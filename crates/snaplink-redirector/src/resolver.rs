use crate::error::ResolveError;
use snaplink_core::{ClickEvent, ClickQueue, ShortCode, UrlCache, UrlLookup};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Thirty days.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30);
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_ENQUEUE_TIMEOUT: Duration = Duration::from_millis(250);
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct ResolverSettings {
    /// TTL of cache entries written after a miss.
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
    /// Upper bound on one authoritative lookup.
    #[builder(default = DEFAULT_LOOKUP_TIMEOUT)]
    pub lookup_timeout: Duration,
    /// Upper bound on pushing one click event.
    #[builder(default = DEFAULT_ENQUEUE_TIMEOUT)]
    pub enqueue_timeout: Duration,
    /// Upper bound on one cache read or write. An elapsed read is a miss.
    #[builder(default = DEFAULT_CACHE_TIMEOUT)]
    pub cache_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Where a resolved URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Cache,
    Lookup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub long_url: String,
    pub source: ResolutionSource,
}

#[derive(Debug)]
struct Inner<C, L, Q> {
    cache: C,
    lookup: L,
    queue: Q,
    settings: ResolverSettings,
}

/// Resolves short codes for the redirect path.
///
/// Holds no per-request state; clones share the same collaborators and can
/// be used from any number of tasks at once.
#[derive(Debug)]
pub struct RedirectResolver<C, L, Q> {
    inner: Arc<Inner<C, L, Q>>,
}

impl<C, L, Q> Clone for RedirectResolver<C, L, Q> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: UrlCache, L: UrlLookup, Q: ClickQueue> RedirectResolver<C, L, Q> {
    /// Creates a resolver with default settings.
    pub fn new(cache: C, lookup: L, queue: Q) -> Self {
        Self::with_settings(cache, lookup, queue, ResolverSettings::default())
    }

    pub fn with_settings(cache: C, lookup: L, queue: Q, settings: ResolverSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                lookup,
                queue,
                settings,
            }),
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.inner.settings
    }

    /// Resolves `code` to its long URL and records a click for it.
    ///
    /// The cache is consulted first. A cache failure or timeout is treated
    /// as a miss.
    /// On a miss the authoritative lookup decides, and a found URL is written
    /// back to the cache. Once a URL is known the result no longer depends on
    /// the cache write or the click queue: failures there are logged only.
    pub async fn resolve(&self, code: &ShortCode) -> Result<Resolved, ResolveError> {
        trace!(code = %code, "resolving short code");

        if let Some(long_url) = self.cached(code).await {
            trace!(code = %code, "cache hit");
            self.record_click(code).await;
            return Ok(Resolved {
                long_url,
                source: ResolutionSource::Cache,
            });
        }

        let long_url = self.lookup(code).await?;
        self.write_back(code, &long_url).await;

        self.record_click(code).await;
        debug!(code = %code, "resolved short code via lookup");
        Ok(Resolved {
            long_url,
            source: ResolutionSource::Lookup,
        })
    }

    async fn cached(&self, code: &ShortCode) -> Option<String> {
        let timeout = self.inner.settings.cache_timeout;
        match tokio::time::timeout(timeout, self.inner.cache.get_url(code)).await {
            Ok(Ok(Some(long_url))) => Some(long_url),
            Ok(Ok(None)) => {
                trace!(code = %code, "cache miss");
                None
            }
            Ok(Err(e)) => {
                warn!(code = %code, error = %e, "cache read failed, treating as miss");
                None
            }
            Err(_) => {
                warn!(code = %code, ?timeout, "cache read timed out, treating as miss");
                None
            }
        }
    }

    async fn write_back(&self, code: &ShortCode, long_url: &str) {
        let settings = &self.inner.settings;
        let write = self.inner.cache.set_url(code, long_url, settings.cache_ttl);
        match tokio::time::timeout(settings.cache_timeout, write).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(code = %code, error = %e, "failed to write resolved URL to cache"),
            Err(_) => warn!(code = %code, timeout = ?settings.cache_timeout, "cache write timed out"),
        }
    }

    async fn lookup(&self, code: &ShortCode) -> Result<String, ResolveError> {
        let timeout = self.inner.settings.lookup_timeout;
        match tokio::time::timeout(timeout, self.inner.lookup.lookup(code)).await {
            Ok(Ok(Some(long_url))) => Ok(long_url),
            Ok(Ok(None)) => {
                debug!(code = %code, "short code not found");
                Err(ResolveError::NotFound)
            }
            Ok(Err(e)) => {
                warn!(code = %code, error = %e, "authoritative lookup failed");
                Err(ResolveError::Unavailable(e.to_string()))
            }
            Err(_) => {
                warn!(code = %code, ?timeout, "authoritative lookup timed out");
                Err(ResolveError::Unavailable(format!(
                    "lookup timed out after {timeout:?}"
                )))
            }
        }
    }

    async fn record_click(&self, code: &ShortCode) {
        let event = ClickEvent::now(code.clone());
        let timeout = self.inner.settings.enqueue_timeout;
        match tokio::time::timeout(timeout, self.inner.queue.push(&event)).await {
            Ok(Ok(())) => trace!(code = %code, "click enqueued"),
            Ok(Err(e)) => warn!(code = %code, error = %e, "failed to enqueue click"),
            Err(_) => warn!(code = %code, ?timeout, "enqueueing click timed out"),
        }
    }
}
