//! Redirect resolution with cache-aside lookups and click recording.
//!
//! This crate provides a [`RedirectResolver`] that turns a short code into
//! the long URL to redirect to. The resolution cache answers the common case;
//! on a miss the resolver asks an authoritative [`UrlLookup`] and writes the
//! answer back to the cache. Every successful resolution pushes a click event
//! onto the click queue without waiting on the counter itself.
//!
//! # Example
//!
//! ```rust
//! use snaplink_redirector::{RedirectResolver, StoreLookup};
//! use snaplink_cache::MokaUrlCache;
//! use snaplink_queue::InMemoryClickQueue;
//! use snaplink_storage::InMemoryMappingStore;
//! use snaplink_core::ShortCode;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let lookup = StoreLookup::new(InMemoryMappingStore::new());
//! let resolver = RedirectResolver::new(MokaUrlCache::new(), lookup, InMemoryClickQueue::new());
//!
//! let code = ShortCode::new("abc123")?;
//! match resolver.resolve(&code).await {
//!     Ok(resolved) => println!("Redirect to: {}", resolved.long_url),
//!     Err(e) => println!("No redirect: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod lookup;
pub mod resolver;

pub use error::ResolveError;
pub use lookup::{HttpUrlLookup, StoreLookup};
pub use resolver::{
    RedirectResolver, ResolutionSource, Resolved, ResolverSettings, DEFAULT_CACHE_TIMEOUT,
    DEFAULT_CACHE_TTL, DEFAULT_ENQUEUE_TIMEOUT, DEFAULT_LOOKUP_TIMEOUT,
};
pub use snaplink_core::UrlLookup;
