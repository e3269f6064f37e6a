//! Click queue implementations.
//!
//! Producers append with [`ClickQueue::push`]; consumers take items with
//! [`ClickQueue::pop`], which hands each payload to exactly one caller.

pub mod memory;
pub mod redis;

pub use memory::InMemoryClickQueue;
pub use self::redis::RedisClickQueue;
pub use snaplink_core::queue::{ClickQueue, Result};
pub use snaplink_core::QueueError;
