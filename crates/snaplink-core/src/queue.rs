use crate::error::QueueError;
use crate::event::ClickEvent;
use async_trait::async_trait;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, QueueError>;

/// An ordered, at-least-once buffer of click events.
///
/// `pop` is consuming: each item is handed to at most one consumer, so
/// several aggregators may drain the same queue.
#[async_trait]
pub trait ClickQueue: Send + Sync + 'static {
    /// Appends one already-encoded payload. Must not wait on consumers.
    async fn push_raw(&self, payload: String) -> Result<()>;

    /// Removes and returns the oldest payload, or `None` if the queue is empty.
    async fn pop(&self) -> Result<Option<String>>;

    /// Number of payloads currently waiting.
    async fn depth(&self) -> Result<usize>;

    /// Encodes `event` into its wire shape and appends it.
    async fn push(&self, event: &ClickEvent) -> Result<()> {
        let payload = event
            .to_payload()
            .map_err(|e| QueueError::Serialization(e.to_string()))?;
        self.push_raw(payload).await
    }
}

#[async_trait]
impl<T: ClickQueue + ?Sized> ClickQueue for Arc<T> {
    async fn push_raw(&self, payload: String) -> Result<()> {
        (**self).push_raw(payload).await
    }

    async fn pop(&self) -> Result<Option<String>> {
        (**self).pop().await
    }

    async fn depth(&self) -> Result<usize> {
        (**self).depth().await
    }

    async fn push(&self, event: &ClickEvent) -> Result<()> {
        (**self).push(event).await
    }
}
