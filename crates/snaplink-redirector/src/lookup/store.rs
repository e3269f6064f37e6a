use async_trait::async_trait;
use snaplink_core::lookup::{Result, UrlLookup};
use snaplink_core::{LookupError, MappingStore, ShortCode};
use tracing::trace;

/// Answers lookups straight from a [`MappingStore`] in the same process.
#[derive(Debug, Clone)]
pub struct StoreLookup<S> {
    store: S,
}

impl<S: MappingStore> StoreLookup<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: MappingStore> UrlLookup for StoreLookup<S> {
    async fn lookup(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "looking up mapping in store");
        let mapping = self
            .store
            .find_by_code(code)
            .await
            .map_err(LookupError::from)?;
        Ok(mapping.map(|m| m.long_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaplink_storage::InMemoryMappingStore;

    #[tokio::test]
    async fn returns_the_long_url_of_stored_mappings() {
        let store = InMemoryMappingStore::new();
        let code = ShortCode::new("abc123").unwrap();
        store
            .create(&code, "https://example.com", "user-1")
            .await
            .unwrap();
        let lookup = StoreLookup::new(store);

        assert_eq!(
            lookup.lookup(&code).await.unwrap().as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            lookup.lookup(&ShortCode::new("nope").unwrap()).await.unwrap(),
            None
        );
    }
}
