//! Mapping store implementations.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryMappingStore;
pub use mysql::MySqlMappingStore;
pub use snaplink_core::store::{MappingStore, Result};
pub use snaplink_core::StorageError;
