//! Create-mapping service.
//!
//! This crate owns the write side of Snaplink: it validates the long URL,
//! allocates a short code that is unused in the mapping store and primes the
//! resolution cache with the new mapping.

pub mod error;
pub mod service;

pub use error::ShortenerError;
pub use service::{ShortenerService, ShortenerSettings, DEFAULT_CACHE_TTL, DEFAULT_MAX_ATTEMPTS};
