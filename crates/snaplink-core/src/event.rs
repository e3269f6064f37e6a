use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A single observed redirect, waiting in the click queue to be counted.
///
/// On the wire this is `{"code": "<code>", "timestamp": <ms since epoch>}`.
/// Older producers wrote the code under `url`; that key is still accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    #[serde(alias = "url")]
    pub code: ShortCode,
    #[serde(
        rename = "timestamp",
        with = "jiff::fmt::serde::timestamp::millisecond::required"
    )]
    pub observed_at: Timestamp,
}

impl ClickEvent {
    /// Creates an event for `code` observed now.
    pub fn now(code: ShortCode) -> Self {
        Self {
            code,
            observed_at: Timestamp::now(),
        }
    }

    /// Encodes the event into its queue payload.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes a queue payload.
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
