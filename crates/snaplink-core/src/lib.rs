//! Core types and traits for the Snaplink URL shortener.
//!
//! This crate provides the domain types shared by every service
//! (short codes, mappings, click events) and the collaborator traits
//! the services are written against: the mapping store, the resolution
//! cache, the click queue and the authoritative lookup.

pub mod cache;
pub mod error;
pub mod event;
pub mod lookup;
pub mod mapping;
pub mod queue;
pub mod shortcode;
pub mod store;

pub use cache::UrlCache;
pub use error::{CacheError, CoreError, LookupError, QueueError, StorageError};
pub use event::ClickEvent;
pub use lookup::UrlLookup;
pub use mapping::Mapping;
pub use queue::ClickQueue;
pub use shortcode::ShortCode;
pub use store::MappingStore;
