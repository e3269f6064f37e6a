use crate::error::ShortenerError;
use snaplink_core::{Mapping, MappingStore, ShortCode, StorageError, UrlCache};
use snaplink_generator::Generator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Thirty days.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30);

#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct ShortenerSettings {
    /// Upper bound on candidates drawn for one mapping.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// TTL of the cache entry written for a new mapping.
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Creates mappings: validates the URL, allocates an unused short code and
/// primes the resolution cache.
///
/// Nothing is reserved while a code is being allocated. The store's unique
/// constraint decides which of two racing writers gets a code, and the loser
/// simply draws again.
#[derive(Debug)]
pub struct ShortenerService<S, C, G> {
    store: Arc<S>,
    cache: Arc<C>,
    generator: Arc<G>,
    settings: ShortenerSettings,
}

impl<S, C, G> Clone for ShortenerService<S, C, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            generator: Arc::clone(&self.generator),
            settings: self.settings,
        }
    }
}

impl<S: MappingStore, C: UrlCache, G: Generator> ShortenerService<S, C, G> {
    /// Creates a new `ShortenerService` with default settings.
    pub fn new(store: S, cache: C, generator: G) -> Self {
        Self::with_settings(store, cache, generator, ShortenerSettings::default())
    }

    pub fn with_settings(store: S, cache: C, generator: G, settings: ShortenerSettings) -> Self {
        Self {
            store: Arc::new(store),
            cache: Arc::new(cache),
            generator: Arc::new(generator),
            settings,
        }
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    /// Validates that the URL is an absolute `http` or `https` URL with a host.
    pub fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }
        if url.chars().any(char::is_whitespace) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must not contain whitespace: {url}"
            )));
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {url}"
            )));
        };

        let scheme = scheme.to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {scheme}"
            )));
        }

        let authority = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        let host = authority.rsplit('@').next().unwrap_or_default();
        if host.is_empty() || host.starts_with(':') {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a host: {url}"
            )));
        }

        Ok(())
    }

    /// Creates a mapping for `long_url` owned by `owner_ref`.
    ///
    /// Draws candidates until one is accepted by the store, up to
    /// `max_attempts` draws. A candidate counts as an attempt whether it is
    /// rejected by the `exists` probe or by the store's unique constraint.
    pub async fn create_mapping(
        &self,
        long_url: &str,
        owner_ref: &str,
    ) -> Result<Mapping, ShortenerError> {
        Self::validate_url(long_url)?;

        let mapping = self.allocate(long_url, owner_ref).await?;
        info!(code = %mapping.code, owner_ref, "created mapping");

        self.prime_cache(&mapping).await;
        Ok(mapping)
    }

    async fn allocate(&self, long_url: &str, owner_ref: &str) -> Result<Mapping, ShortenerError> {
        let max_attempts = self.settings.max_attempts;
        let mut attempts = 0;

        while attempts < max_attempts {
            attempts += 1;
            let candidate = self.generator.generate();

            if self.store.exists(&candidate).await? {
                debug!(code = %candidate, attempts, "candidate already taken");
                continue;
            }

            match self.store.create(&candidate, long_url, owner_ref).await {
                Ok(mapping) => return Ok(mapping),
                Err(StorageError::Conflict(_)) => {
                    debug!(code = %candidate, attempts, "candidate claimed concurrently");
                }
                Err(e) => return Err(e.into()),
            }
        }

        error!(
            attempts,
            "short code generation exhausted; the generator namespace is too small"
        );
        Err(ShortenerError::GenerationExhausted { attempts })
    }

    async fn prime_cache(&self, mapping: &Mapping) {
        if let Err(e) = self
            .cache
            .set_url(&mapping.code, &mapping.long_url, self.settings.cache_ttl)
            .await
        {
            warn!(code = %mapping.code, error = %e, "failed to prime cache for new mapping");
        }
    }

    /// Fetches the stored mapping, including its current click count.
    pub async fn find(&self, code: &ShortCode) -> Result<Option<Mapping>, ShortenerError> {
        Ok(self.store.find_by_code(code).await?)
    }

    /// Lists the mappings created by `owner_ref`, newest first.
    pub async fn list_by_owner(&self, owner_ref: &str) -> Result<Vec<Mapping>, ShortenerError> {
        Ok(self.store.list_by_owner(owner_ref).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use snaplink_cache::MokaUrlCache;
    use snaplink_core::CacheError;
    use snaplink_generator::{AlphabetGenerator, GeneratorSettings};
    use snaplink_storage::InMemoryMappingStore;
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;

    type TestService = ShortenerService<Arc<InMemoryMappingStore>, MokaUrlCache, AlphabetGenerator>;

    fn digits(seed: u64) -> AlphabetGenerator {
        AlphabetGenerator::new(
            GeneratorSettings::builder()
                .alphabet("0123456789")
                .length(4)
                .seed(seed)
                .build(),
        )
        .unwrap()
    }

    fn test_service() -> (TestService, Arc<InMemoryMappingStore>, MokaUrlCache) {
        let store = Arc::new(InMemoryMappingStore::new());
        let cache = MokaUrlCache::new();
        let service = ShortenerService::new(Arc::clone(&store), cache.clone(), AlphabetGenerator::url_safe());
        (service, store, cache)
    }

    /// Hands out a fixed list of candidates in order.
    struct ScriptedGenerator(Mutex<VecDeque<ShortCode>>);

    impl ScriptedGenerator {
        fn new(codes: &[&str]) -> Self {
            Self(Mutex::new(
                codes.iter().map(|c| ShortCode::new(c).unwrap()).collect(),
            ))
        }
    }

    impl Generator for ScriptedGenerator {
        fn generate(&self) -> ShortCode {
            self.0.lock().unwrap().pop_front().expect("script exhausted")
        }
    }

    /// A store whose `exists` probe never sees anything, like a racing writer
    /// that inserts between the probe and the write.
    struct BlindProbeStore(InMemoryMappingStore);

    #[async_trait]
    impl MappingStore for BlindProbeStore {
        async fn create(
            &self,
            code: &ShortCode,
            long_url: &str,
            owner_ref: &str,
        ) -> snaplink_core::store::Result<Mapping> {
            self.0.create(code, long_url, owner_ref).await
        }

        async fn exists(&self, _code: &ShortCode) -> snaplink_core::store::Result<bool> {
            Ok(false)
        }

        async fn find_by_code(&self, code: &ShortCode) -> snaplink_core::store::Result<Option<Mapping>> {
            self.0.find_by_code(code).await
        }

        async fn increment_count(&self, code: &ShortCode) -> snaplink_core::store::Result<()> {
            self.0.increment_count(code).await
        }

        async fn list_by_owner(&self, owner_ref: &str) -> snaplink_core::store::Result<Vec<Mapping>> {
            self.0.list_by_owner(owner_ref).await
        }
    }

    struct DownStore;

    #[async_trait]
    impl MappingStore for DownStore {
        async fn create(&self, _: &ShortCode, _: &str, _: &str) -> snaplink_core::store::Result<Mapping> {
            Err(StorageError::Unavailable("connection refused".into()))
        }

        async fn exists(&self, _: &ShortCode) -> snaplink_core::store::Result<bool> {
            Err(StorageError::Unavailable("connection refused".into()))
        }

        async fn find_by_code(&self, _: &ShortCode) -> snaplink_core::store::Result<Option<Mapping>> {
            Err(StorageError::Unavailable("connection refused".into()))
        }

        async fn increment_count(&self, _: &ShortCode) -> snaplink_core::store::Result<()> {
            Err(StorageError::Unavailable("connection refused".into()))
        }

        async fn list_by_owner(&self, _: &str) -> snaplink_core::store::Result<Vec<Mapping>> {
            Err(StorageError::Unavailable("connection refused".into()))
        }
    }

    struct DownCache;

    #[async_trait]
    impl UrlCache for DownCache {
        async fn get_url(&self, _: &ShortCode) -> snaplink_core::cache::Result<Option<String>> {
            Err(CacheError::Unavailable("cache down".into()))
        }

        async fn set_url(&self, _: &ShortCode, _: &str, _: Duration) -> snaplink_core::cache::Result<()> {
            Err(CacheError::Unavailable("cache down".into()))
        }

        async fn del(&self, _: &ShortCode) -> snaplink_core::cache::Result<()> {
            Err(CacheError::Unavailable("cache down".into()))
        }
    }

    #[tokio::test]
    async fn create_mapping_stores_and_primes_cache() {
        let (service, store, cache) = test_service();

        let mapping = service
            .create_mapping("https://example.com/a/long/path", "user-1")
            .await
            .unwrap();

        assert_eq!(mapping.code.as_str().len(), 7);
        assert_eq!(mapping.click_count, 0);
        assert_eq!(mapping.owner_ref, "user-1");

        let stored = store.find_by_code(&mapping.code).await.unwrap().unwrap();
        assert_eq!(stored, mapping);
        assert_eq!(
            cache.get_url(&mapping.code).await.unwrap().as_deref(),
            Some("https://example.com/a/long/path")
        );
    }

    #[tokio::test]
    async fn create_mapping_rejects_invalid_urls() {
        let (service, store, _) = test_service();

        for url in [
            "",
            "not-a-valid-url",
            "ftp://example.com",
            "https://",
            "https:///path",
            "http://exa mple.com",
        ] {
            let err = service.create_mapping(url, "user-1").await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidUrl(_)), "{url}: {err}");
        }
        assert!(store.is_empty());
    }

    #[test]
    fn accepts_common_url_shapes() {
        for url in [
            "http://example.com",
            "HTTPS://example.com/path?q=1#frag",
            "https://user:pw@example.com:8443/",
            "http://127.0.0.1:3000/x",
        ] {
            assert!(TestService::validate_url(url).is_ok(), "{url}");
        }
    }

    #[tokio::test]
    async fn skips_candidates_that_already_exist() {
        let store = InMemoryMappingStore::new();
        for taken in ["taken1", "taken2"] {
            store
                .create(&ShortCode::new(taken).unwrap(), "https://old.example", "someone")
                .await
                .unwrap();
        }
        let service = ShortenerService::new(
            store,
            MokaUrlCache::new(),
            ScriptedGenerator::new(&["taken1", "taken2", "fresh1"]),
        );

        let mapping = service
            .create_mapping("https://new.example", "user-1")
            .await
            .unwrap();
        assert_eq!(mapping.code.as_str(), "fresh1");
    }

    #[tokio::test]
    async fn redraws_when_the_write_hits_the_unique_constraint() {
        let inner = InMemoryMappingStore::new();
        inner
            .create(&ShortCode::new("raced").unwrap(), "https://winner.example", "other")
            .await
            .unwrap();
        let service = ShortenerService::new(
            BlindProbeStore(inner),
            MokaUrlCache::new(),
            ScriptedGenerator::new(&["raced", "mine"]),
        );

        let mapping = service
            .create_mapping("https://loser.example", "user-1")
            .await
            .unwrap();
        assert_eq!(mapping.code.as_str(), "mine");

        let winner = service
            .find(&ShortCode::new("raced").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(winner.long_url, "https://winner.example");
    }

    #[tokio::test]
    async fn gives_up_after_the_attempt_cap() {
        let store = InMemoryMappingStore::new();
        store
            .create(&ShortCode::new("dup").unwrap(), "https://old.example", "someone")
            .await
            .unwrap();
        let service = ShortenerService::with_settings(
            store,
            MokaUrlCache::new(),
            ScriptedGenerator::new(&["dup", "dup", "dup", "unused"]),
            ShortenerSettings::builder().max_attempts(3).build(),
        );

        let err = service
            .create_mapping("https://new.example", "user-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::GenerationExhausted { attempts: 3 }));
    }

    #[tokio::test]
    async fn storage_failures_surface_as_storage_errors() {
        let service = ShortenerService::new(DownStore, MokaUrlCache::new(), AlphabetGenerator::url_safe());

        let err = service
            .create_mapping("https://example.com", "user-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::Storage(StorageError::Unavailable(_))));
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn cache_failure_does_not_fail_creation() {
        let store = Arc::new(InMemoryMappingStore::new());
        let service = ShortenerService::new(Arc::clone(&store), DownCache, AlphabetGenerator::url_safe());

        let mapping = service
            .create_mapping("https://example.com", "user-1")
            .await
            .unwrap();
        assert!(store.exists(&mapping.code).await.unwrap());
    }

    #[tokio::test]
    async fn fills_a_small_namespace_without_duplicates() {
        let store = Arc::new(InMemoryMappingStore::with_capacity(10_000));
        let service = ShortenerService::with_settings(
            Arc::clone(&store),
            MokaUrlCache::with_capacity(100),
            digits(1),
            ShortenerSettings::builder().max_attempts(1_000_000).build(),
        );

        let mut seen = HashSet::with_capacity(10_000);
        for _ in 0..10_000 {
            let mapping = service
                .create_mapping("https://example.com", "user-1")
                .await
                .unwrap();
            assert!(seen.insert(mapping.code.as_str().to_string()));
        }
        assert_eq!(store.len(), 10_000);

        let service = ShortenerService::with_settings(
            Arc::clone(&store),
            MokaUrlCache::with_capacity(100),
            digits(2),
            ShortenerSettings::builder().max_attempts(200_000).build(),
        );
        let err = service
            .create_mapping("https://example.com", "user-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::GenerationExhausted { attempts: 200_000 }
        ));
        assert_eq!(store.len(), 10_000);
    }

    #[tokio::test]
    async fn near_exhausted_namespace_hands_out_the_last_code_once() {
        let store = Arc::new(InMemoryMappingStore::with_capacity(10_000));
        for n in 0..10_000u32 {
            if n == 4242 {
                continue;
            }
            let code = ShortCode::new(format!("{n:04}")).unwrap();
            store.create(&code, "https://taken.example", "seed").await.unwrap();
        }

        // One free code among 10,000: a million draws cannot reasonably miss it.
        let generous = ShortenerSettings::builder().max_attempts(1_000_000).build();
        let service = ShortenerService::with_settings(
            Arc::clone(&store),
            MokaUrlCache::new(),
            digits(7),
            generous,
        );
        let mapping = service
            .create_mapping("https://last.example", "user-1")
            .await
            .unwrap();
        assert_eq!(mapping.code.as_str(), "4242");
        assert_eq!(store.len(), 10_000);

        let capped = ShortenerSettings::builder().max_attempts(1_000).build();
        let service = ShortenerService::with_settings(
            Arc::clone(&store),
            MokaUrlCache::new(),
            digits(8),
            capped,
        );
        let err = service
            .create_mapping("https://one-too-many.example", "user-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::GenerationExhausted { attempts: 1_000 }
        ));
        assert_eq!(store.len(), 10_000);
    }

    #[tokio::test]
    async fn lists_mappings_by_owner() {
        let (service, _, _) = test_service();

        let first = service.create_mapping("https://a.example", "alice").await.unwrap();
        let second = service.create_mapping("https://b.example", "alice").await.unwrap();
        service.create_mapping("https://c.example", "bob").await.unwrap();

        let listed = service.list_by_owner("alice").await.unwrap();
        let codes: HashSet<_> = listed.iter().map(|m| m.code.clone()).collect();
        assert_eq!(listed.len(), 2);
        assert!(codes.contains(&first.code));
        assert!(codes.contains(&second.code));
        assert!(service.list_by_owner("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_returns_none_for_unknown_codes() {
        let (service, _, _) = test_service();
        let found = service.find(&ShortCode::new("missing").unwrap()).await.unwrap();
        assert!(found.is_none());
    }
}
