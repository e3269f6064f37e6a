//! Resolution cache implementations.
//!
//! Both caches store short code -> long URL only and honour a TTL per entry,
//! so an entry is never served after the expiry it was written with.

pub mod moka;
pub mod redis;

pub use self::moka::MokaUrlCache;
pub use self::redis::RedisUrlCache;
pub use snaplink_core::cache::{Result, UrlCache};
pub use snaplink_core::CacheError;
