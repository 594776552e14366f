use async_trait::async_trait;

use seedbomb_core::{MessageId, ProcessedRecord};

use crate::error::StateError;

/// Persisted set of processed message identifiers.
///
/// Implementations must be `Send + Sync` and safe for concurrent access. No
/// locking spans [`exists`](Self::exists) and [`record`](Self::record): two
/// concurrent deliveries of the same id may both observe "not processed".
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Returns `true` if a [`ProcessedRecord`] exists for `id`.
    async fn exists(&self, id: &MessageId) -> Result<bool, StateError>;

    /// Write a record with write-once semantics.
    ///
    /// Returns `true` if the record was newly written and `false` if a record
    /// for the same id was already present, in which case the stored record is
    /// left untouched. Writing an existing id is never an error.
    async fn record(&self, record: &ProcessedRecord) -> Result<bool, StateError>;

    /// Read back the stored record for `id`, if any.
    async fn get(&self, id: &MessageId) -> Result<Option<ProcessedRecord>, StateError>;
}
