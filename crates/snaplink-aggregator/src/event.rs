use serde_json::error::Category;
use snaplink_core::ClickEvent;
use thiserror::Error;

/// A queue payload that can never be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEvent {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),
    /// Valid JSON, but not a click event: missing fields, wrong types or a
    /// code that fails validation.
    #[error("payload has the wrong shape: {0}")]
    InvalidShape(String),
}

/// Decodes one click queue payload.
pub fn parse_event(payload: &str) -> Result<ClickEvent, MalformedEvent> {
    ClickEvent::from_payload(payload).map_err(|e| match e.classify() {
        Category::Data => MalformedEvent::InvalidShape(e.to_string()),
        Category::Syntax | Category::Eof | Category::Io => {
            MalformedEvent::InvalidJson(e.to_string())
        }
    })
}
