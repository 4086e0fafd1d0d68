//! In-memory store, useful for testing and throwaway sessions.

use async_trait::async_trait;
use careerlens_core::error::StoreError;
use careerlens_core::memory::ReflectionStore;
use careerlens_core::reflection::{NewReflection, Reflection};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Log {
    next_id: i64,
    entries: Vec<Reflection>,
}

/// A store that keeps reflections in a Vec.
/// Nothing survives the process.
pub struct InMemoryStore {
    log: Arc<RwLock<Log>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            log: Arc::new(RwLock::new(Log::default())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(entries: &[Reflection]) -> Vec<Reflection> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    sorted
}

#[async_trait]
impl ReflectionStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, reflection: NewReflection) -> Result<Reflection, StoreError> {
        let mut log = self.log.write().await;
        log.next_id += 1;
        let stored = reflection.into_reflection(log.next_id, Utc::now());
        log.entries.push(stored.clone());
        Ok(stored)
    }

    async fn list_newest_first(&self) -> Result<Vec<Reflection>, StoreError> {
        Ok(newest_first(&self.log.read().await.entries))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Reflection>, StoreError> {
        let mut entries = newest_first(&self.log.read().await.entries);
        entries.truncate(limit);
        Ok(entries)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.log.read().await.entries.len())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_then_list_returns_it_first() {
        let store = InMemoryStore::new();
        store
            .append(NewReflection::new("q1", "a1").unwrap())
            .await
            .unwrap();
        let saved = store
            .append(NewReflection::new("q2", "a2 with trailing space ").unwrap())
            .await
            .unwrap();

        let all = store.list_newest_first().await.unwrap();
        assert_eq!(all[0], saved);
        assert_eq!(all[0].answer, "a2 with trailing space ");
    }

    #[tokio::test]
    async fn recent_truncates() {
        let store = InMemoryStore::new();
        for i in 0..3 {
            store
                .append(NewReflection::new(format!("q{i}"), "a").unwrap())
                .await
                .unwrap();
        }
        let recent = store.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].question, "q2");
        assert_eq!(store.count().await.unwrap(), 3);
    }
}
