use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use snaplink_core::Mapping;

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    /// Absolute `http` or `https` URL with a host. Other schemes, such as
    /// `ftp` or `mailto`, are rejected with `400`.
    pub long_url: String,
    pub owner_ref: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MappingResponse {
    pub code: String,
    pub short_url: String,
    pub long_url: String,
    pub click_count: u64,
    pub created_at: Timestamp,
}

impl MappingResponse {
    pub fn from_mapping(mapping: Mapping, base_url: &str) -> Self {
        Self {
            short_url: mapping.code.to_url(base_url),
            code: mapping.code.to_string(),
            long_url: mapping.long_url,
            click_count: mapping.click_count,
            created_at: mapping.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub long_url: String,
}
