use std::time::Duration;

use snaplink_cache::{RedisUrlCache, UrlCache};
use snaplink_core::ShortCode;
use snaplink_test_infra::redis::RedisServer;

/// Test fixture that keeps the Redis container alive for the test's duration.
struct Fixture {
    _redis: RedisServer,
    cache: RedisUrlCache,
}

impl Fixture {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("start redis");
        let url = redis.url().await.expect("redis url");

        // Wait a moment to ensure Redis is fully ready
        tokio::time::sleep(Duration::from_millis(500)).await;

        let cache = RedisUrlCache::connect(&url, "test:url:")
            .await
            .expect("connect redis cache");
        Self {
            _redis: redis,
            cache,
        }
    }
}

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn redis_cache_get_set_del() {
    let fixture = Fixture::start().await;
    let code = ShortCode::new("test123").unwrap();

    assert!(fixture.cache.get_url(&code).await.unwrap().is_none());

    fixture
        .cache
        .set_url(&code, "https://example.com", DAY)
        .await
        .unwrap();
    assert_eq!(
        fixture.cache.get_url(&code).await.unwrap().as_deref(),
        Some("https://example.com")
    );

    fixture.cache.del(&code).await.unwrap();
    assert!(fixture.cache.get_url(&code).await.unwrap().is_none());

    // Deleting a missing key is fine.
    fixture.cache.del(&code).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn redis_cache_entry_expires_after_ttl() {
    let fixture = Fixture::start().await;
    let code = ShortCode::new("ttl123").unwrap();

    fixture
        .cache
        .set_url(&code, "https://example.com", Duration::from_millis(200))
        .await
        .unwrap();
    assert!(fixture.cache.get_url(&code).await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(fixture.cache.get_url(&code).await.unwrap().is_none());
}
