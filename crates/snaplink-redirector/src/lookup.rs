//! Authoritative lookups consulted on a cache miss.

mod http;
mod store;

pub use http::HttpUrlLookup;
pub use store::StoreLookup;
