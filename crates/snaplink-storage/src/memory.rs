use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use snaplink_core::store::{MappingStore, Result};
use snaplink_core::{Mapping, ShortCode, StorageError};
use tracing::trace;

/// In-memory implementation of [`MappingStore`] using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. The entry API gives `create` the same
/// check-and-insert atomicity a unique index gives a database.
#[derive(Debug, Default)]
pub struct InMemoryMappingStore {
    storage: DashMap<String, Mapping>,
}

impl InMemoryMappingStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Creates a new in-memory store with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    /// Number of mappings held.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl MappingStore for InMemoryMappingStore {
    async fn create(&self, code: &ShortCode, long_url: &str, owner_ref: &str) -> Result<Mapping> {
        match self.storage.entry(code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            Entry::Vacant(slot) => {
                let mapping = Mapping::new(code.clone(), long_url, owner_ref);
                slot.insert(mapping.clone());
                trace!(code = %code, "stored mapping");
                Ok(mapping)
            }
        }
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.contains_key(code.as_str()))
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        Ok(self.storage.get(code.as_str()).map(|entry| entry.clone()))
    }

    async fn increment_count(&self, code: &ShortCode) -> Result<()> {
        let Some(mut entry) = self.storage.get_mut(code.as_str()) else {
            return Err(StorageError::NotFound(code.to_string()));
        };
        entry.click_count = entry.click_count.saturating_add(1);
        Ok(())
    }

    async fn list_by_owner(&self, owner_ref: &str) -> Result<Vec<Mapping>> {
        let mut mappings: Vec<Mapping> = self
            .storage
            .iter()
            .filter(|entry| entry.owner_ref == owner_ref)
            .map(|entry| entry.value().clone())
            .collect();
        mappings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.code.cmp(&b.code))
        });
        Ok(mappings)
    }
}
