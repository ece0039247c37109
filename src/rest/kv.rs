//! The key-value seam the REST backend writes through.
//!
//! The store is an opaque external collaborator with get/set/prefix-scan
//! and no declared transactional semantics. The shipped implementation is
//! an ordered in-memory map; an external store slots in behind the same
//! trait.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()>;
    async fn get_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<Value>>;
}

#[derive(Clone, Default)]
pub struct MemoryKv {
    entries: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Value>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        self.lock().insert(key.to_owned(), value);
        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<Value>> {
        Ok(self
            .lock()
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, value)| value.clone())
            .collect())
    }
}
