use std::time::Duration;

use snaplink_core::{ClickEvent, ShortCode};
use snaplink_queue::{ClickQueue, RedisClickQueue};
use snaplink_test_infra::redis::RedisServer;

struct Fixture {
    _redis: RedisServer,
    url: String,
}

impl Fixture {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("start redis");
        let url = redis.url().await.expect("redis url");

        // Wait a moment to ensure Redis is fully ready
        tokio::time::sleep(Duration::from_millis(500)).await;

        Self { _redis: redis, url }
    }

    async fn queue(&self, key: &str) -> RedisClickQueue {
        RedisClickQueue::connect(&self.url, key)
            .await
            .expect("connect redis queue")
    }
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn redis_queue_is_fifo() {
    let fixture = Fixture::start().await;
    let queue = fixture.queue("test:clicks").await;

    queue.push_raw("one".to_string()).await.unwrap();
    queue.push_raw("two".to_string()).await.unwrap();
    assert_eq!(queue.depth().await.unwrap(), 2);

    assert_eq!(queue.pop().await.unwrap().as_deref(), Some("one"));
    assert_eq!(queue.pop().await.unwrap().as_deref(), Some("two"));
    assert_eq!(queue.pop().await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn producer_and_consumer_share_a_list_key() {
    let fixture = Fixture::start().await;
    let producer = fixture.queue("shared:clicks").await;
    let consumer = fixture.queue("shared:clicks").await;

    let event = ClickEvent::now(ShortCode::new("abc123").unwrap());
    producer.push(&event).await.unwrap();

    let payload = consumer.pop().await.unwrap().expect("payload");
    let decoded = ClickEvent::from_payload(&payload).unwrap();
    assert_eq!(decoded.code.as_str(), "abc123");
    assert!(producer.pop().await.unwrap().is_none());
}
