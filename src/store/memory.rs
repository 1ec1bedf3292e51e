use super::KeyValueStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn entry_count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = InMemoryStore::new();
        store.set("keyword:alpha", "2").await.unwrap();

        assert_eq!(store.get("keyword:alpha").await.unwrap(), Some("2".to_string()));
        assert!(store.delete("keyword:alpha").await.unwrap());
        assert!(!store.delete("keyword:alpha").await.unwrap());
        assert_eq!(store.get("keyword:alpha").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_with_prefix_is_ordered_and_scoped() {
        let store = InMemoryStore::new();
        for key in ["keyword:b", "keyterm:x", "keyword:a", "keywords", "other"] {
            store.set(key, "1").await.unwrap();
        }

        let keys = store.keys_with_prefix("keyword:").await.unwrap();
        assert_eq!(keys, vec!["keyword:a", "keyword:b"]);
        assert_eq!(store.entry_count().await.unwrap(), 5);
    }
}
