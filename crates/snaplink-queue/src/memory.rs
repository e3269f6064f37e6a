use async_trait::async_trait;
use snaplink_core::queue::{ClickQueue, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::trace;

/// A process-local FIFO click queue.
///
/// Clones share the same buffer, so a resolver and an embedded aggregator
/// can hold the two ends of one queue. Contents are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClickQueue {
    items: Arc<Mutex<VecDeque<String>>>,
}

impl InMemoryClickQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClickQueue for InMemoryClickQueue {
    async fn push_raw(&self, payload: String) -> Result<()> {
        self.items.lock().await.push_back(payload);
        trace!("click payload enqueued in memory");
        Ok(())
    }

    async fn pop(&self) -> Result<Option<String>> {
        Ok(self.items.lock().await.pop_front())
    }

    async fn depth(&self) -> Result<usize> {
        Ok(self.items.lock().await.len())
    }
}
