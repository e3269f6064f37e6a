use std::sync::Arc;
use std::time::Duration;

use snaplink_core::{ClickQueue, MappingStore, UrlCache, UrlLookup};
use snaplink_generator::{AlphabetGenerator, Generator};
use snaplink_redirector::{RedirectResolver, ResolverSettings, StoreLookup};
use snaplink_shortener::{ShortenerService, ShortenerSettings};
use typed_builder::TypedBuilder;

pub type DynShortener =
    ShortenerService<Arc<dyn MappingStore>, Arc<dyn UrlCache>, Arc<dyn Generator>>;
pub type DynResolver =
    RedirectResolver<Arc<dyn UrlCache>, Arc<dyn UrlLookup>, Arc<dyn ClickQueue>>;

/// The collaborators and knobs an [`AppState`] is assembled from.
#[derive(TypedBuilder)]
pub struct AppParts {
    store: Arc<dyn MappingStore>,
    cache: Arc<dyn UrlCache>,
    queue: Arc<dyn ClickQueue>,
    /// Authoritative lookup for redirects. Defaults to the local store.
    /// A gateway given another lookup only redirects; it does not own
    /// mappings.
    #[builder(default, setter(strip_option))]
    lookup: Option<Arc<dyn UrlLookup>>,
    #[builder(default = Arc::new(AlphabetGenerator::url_safe()) as Arc<dyn Generator>)]
    generator: Arc<dyn Generator>,
    #[builder(default)]
    shortener: ShortenerSettings,
    #[builder(default)]
    resolver: ResolverSettings,
    /// Public origin short URLs are built from, e.g. `https://snap.ink`.
    #[builder(setter(into))]
    base_url: String,
}

#[derive(Clone)]
pub struct AppState {
    shortener: DynShortener,
    resolver: DynResolver,
    cache: Arc<dyn UrlCache>,
    cache_ttl: Duration,
    base_url: Arc<str>,
    owns_mappings: bool,
}

impl AppState {
    pub fn new(parts: AppParts) -> Self {
        let owns_mappings = parts.lookup.is_none();
        let lookup: Arc<dyn UrlLookup> = match parts.lookup {
            Some(lookup) => lookup,
            None => Arc::new(StoreLookup::new(Arc::clone(&parts.store))),
        };

        let shortener = ShortenerService::with_settings(
            Arc::clone(&parts.store),
            Arc::clone(&parts.cache),
            parts.generator,
            parts.shortener,
        );
        let resolver = RedirectResolver::with_settings(
            Arc::clone(&parts.cache),
            lookup,
            parts.queue,
            parts.resolver,
        );

        Self {
            shortener,
            resolver,
            cache: parts.cache,
            cache_ttl: parts.resolver.cache_ttl,
            base_url: parts.base_url.trim_end_matches('/').into(),
            owns_mappings,
        }
    }

    pub fn shortener(&self) -> &DynShortener {
        &self.shortener
    }

    pub fn resolver(&self) -> &DynResolver {
        &self.resolver
    }

    pub fn cache(&self) -> &Arc<dyn UrlCache> {
        &self.cache
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether redirects resolve against the local store. Only then are
    /// creation, inspection and `/resolve` answered here.
    pub fn owns_mappings(&self) -> bool {
        self.owns_mappings
    }
}
