use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use seedbomb_core::{MessageId, ProcessedRecord};
use seedbomb_state::error::StateError;
use seedbomb_state::store::DedupStore;

/// In-memory [`DedupStore`] backed by a [`DashMap`].
///
/// Suitable for local development and tests only: the processed set does
/// not survive a restart and is not shared between processes.
#[derive(Debug, Default)]
pub struct MemoryDedupStore {
    data: DashMap<MessageId, DateTime<Utc>>,
}

impl MemoryDedupStore {
    /// Create a new, empty in-memory dedup store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded ids.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl DedupStore for MemoryDedupStore {
    async fn exists(&self, id: &MessageId) -> Result<bool, StateError> {
        Ok(self.data.contains_key(id))
    }

    async fn record(&self, record: &ProcessedRecord) -> Result<bool, StateError> {
        // Use `entry` API for atomicity: only insert if vacant.
        let was_inserted = match self.data.entry(record.message_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(record.processed_at);
                true
            }
        };
        Ok(was_inserted)
    }

    async fn get(&self, id: &MessageId) -> Result<Option<ProcessedRecord>, StateError> {
        Ok(self
            .data
            .get(id)
            .map(|at| ProcessedRecord::new(id.clone(), *at)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn conformance() {
        let store = MemoryDedupStore::new();
        seedbomb_state::testing::run_store_conformance_tests(&store, "mem")
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn concurrent_records_write_once() {
        let store = Arc::new(MemoryDedupStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.record(&ProcessedRecord::now("race")).await.unwrap()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1, "exactly one concurrent writer should win");
        assert_eq!(store.len(), 1);
    }
}
