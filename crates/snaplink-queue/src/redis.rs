use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use snaplink_core::queue::{ClickQueue, Result};
use snaplink_core::QueueError;
use tracing::{info, trace, warn};

pub const DEFAULT_QUEUE_KEY: &str = "increment_count";

/// A click queue backed by a Redis list.
///
/// Producers `LPUSH` onto the list and consumers `RPOP` from the other end,
/// which gives FIFO order and hands every item to a single consumer.
#[derive(Clone)]
pub struct RedisClickQueue {
    conn: ConnectionManager,
    key: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> QueueError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        QueueError::Timeout(message)
    } else if err.is_io_error() {
        QueueError::Unavailable(message)
    } else {
        QueueError::Operation(message)
    }
}

impl RedisClickQueue {
    /// Creates a queue on the list stored at `key`.
    pub fn new(conn: ConnectionManager, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    /// Connects to `redis_url` and verifies the connection with a `PING`.
    pub async fn connect(redis_url: &str, key: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| map_redis_error("invalid Redis URL", e))?;
        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        let _: () = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("Redis PING failed", e))?;

        let queue = Self::new(conn, key);
        info!(key = %queue.key, "connected to Redis click queue");
        Ok(queue)
    }

    /// The Redis key of the backing list.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Debug for RedisClickQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClickQueue")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ClickQueue for RedisClickQueue {
    async fn push_raw(&self, payload: String) -> Result<()> {
        let mut conn = self.conn.clone();
        match conn.lpush::<_, _, ()>(&self.key, payload).await {
            Ok(()) => {
                trace!(key = %self.key, "click payload pushed to Redis");
                Ok(())
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to push click payload to Redis");
                Err(map_redis_error("failed to push onto Redis list", e))
            }
        }
    }

    async fn pop(&self) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        conn.rpop::<_, Option<String>>(&self.key, None)
            .await
            .map_err(|e| map_redis_error("failed to pop from Redis list", e))
    }

    async fn depth(&self) -> Result<usize> {
        let mut conn = self.conn.clone();
        conn.llen::<_, usize>(&self.key)
            .await
            .map_err(|e| map_redis_error("failed to read Redis list length", e))
    }
}
