//! Keyword and keyterm lists on top of a [`KeyValueStore`].
//!
//! Keywords carry an integer boost and are stored as `keyword:<word>` -> boost.
//! Keyterms have no value of their own and are stored as `keyterm:<term>` -> "1".

use super::KeyValueStore;
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

const KEYWORD_PREFIX: &str = "keyword:";
const KEYTERM_PREFIX: &str = "keyterm:";

#[derive(Clone)]
pub struct KeywordManager {
    store: Arc<dyn KeyValueStore>,
}

impl KeywordManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn add_keywords(&self, keywords: &BTreeMap<String, i64>) -> Result<()> {
        for (keyword, boost) in keywords {
            self.store
                .set(&format!("{KEYWORD_PREFIX}{keyword}"), &boost.to_string())
                .await?;
        }
        info!(count = keywords.len(), "Stored keywords");
        Ok(())
    }

    /// Returns how many of the given keywords existed.
    pub async fn delete_keywords(&self, keywords: &[String]) -> Result<usize> {
        let mut removed = 0;
        for keyword in keywords {
            if self.store.delete(&format!("{KEYWORD_PREFIX}{keyword}")).await? {
                removed += 1;
            }
        }
        info!(requested = keywords.len(), removed, "Deleted keywords");
        Ok(removed)
    }

    /// All keywords formatted as `word:boost`, ordered by word.
    pub async fn list_keywords(&self) -> Result<Vec<String>> {
        let mut result = Vec::new();
        for key in self.store.keys_with_prefix(KEYWORD_PREFIX).await? {
            // A concurrent delete can remove the key between scan and read.
            if let Some(boost) = self.store.get(&key).await? {
                let keyword = &key[KEYWORD_PREFIX.len()..];
                result.push(format!("{keyword}:{boost}"));
            }
        }
        Ok(result)
    }
}

#[derive(Clone)]
pub struct KeytermManager {
    store: Arc<dyn KeyValueStore>,
}

impl KeytermManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn add_keyterm(&self, keyterm: &str) -> Result<()> {
        self.store.set(&format!("{KEYTERM_PREFIX}{keyterm}"), "1").await?;
        info!(keyterm = %keyterm, "Stored keyterm");
        Ok(())
    }

    pub async fn delete_keyterm(&self, keyterm: &str) -> Result<bool> {
        let removed = self.store.delete(&format!("{KEYTERM_PREFIX}{keyterm}")).await?;
        info!(keyterm = %keyterm, removed, "Deleted keyterm");
        Ok(removed)
    }

    pub async fn list_keyterms(&self) -> Result<Vec<String>> {
        Ok(self
            .store
            .keys_with_prefix(KEYTERM_PREFIX)
            .await?
            .into_iter()
            .map(|key| key[KEYTERM_PREFIX.len()..].to_string())
            .collect())
    }
}
