//! Short code candidate generation.
//!
//! Generators here are pure: they never look at storage. Checking a
//! candidate against the mapping store, and retrying on collision, is the
//! shortener's job.

pub mod alphabet;

pub use alphabet::{AlphabetGenerator, GeneratorError, GeneratorSettings, URL_SAFE_ALPHABET};

use snaplink_core::ShortCode;
use std::sync::Arc;

/// Trait for generating short code candidates.
///
/// Implementations can vary from simple random generators to
/// distributed ID generators. A candidate is not guaranteed to be unused.
pub trait Generator: Send + Sync + 'static {
    /// Draws the next candidate.
    fn generate(&self) -> ShortCode;
}

impl<T: Generator + ?Sized> Generator for Arc<T> {
    fn generate(&self) -> ShortCode {
        (**self).generate()
    }
}
