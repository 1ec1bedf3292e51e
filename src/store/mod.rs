//! # Key-Value Store
//!
//! Global keyword and keyterm lists live behind [`KeyValueStore`], a minimal
//! string-keyed interface. The store is responsible for its own locking;
//! callers share it through an `Arc` and never coordinate among themselves.

pub mod keywords;
pub mod memory;

pub use keywords::{KeytermManager, KeywordManager};
pub use memory::InMemoryStore;

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Returns whether a value was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// All keys starting with `prefix`, in ascending order.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Number of stored entries across all prefixes.
    async fn entry_count(&self) -> Result<usize>;
}
