use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// One shortened link as recorded by the mapping store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub code: ShortCode,
    pub long_url: String,
    /// Number of clicks applied so far. Only the aggregator moves it, and only upwards.
    pub click_count: u64,
    /// Opaque reference to the principal that created the mapping.
    pub owner_ref: String,
    pub created_at: Timestamp,
}

impl Mapping {
    /// Creates a fresh mapping with a zero click count, stamped with the current time.
    pub fn new(code: ShortCode, long_url: impl Into<String>, owner_ref: impl Into<String>) -> Self {
        Self {
            code,
            long_url: long_url.into(),
            click_count: 0,
            owner_ref: owner_ref.into(),
            created_at: Timestamp::now(),
        }
    }
}
