use chrono::{TimeZone, Utc};

use seedbomb_core::{MessageId, ProcessedRecord};

use crate::error::StateError;
use crate::store::DedupStore;

fn record_at(id: &str, secs: i64) -> ProcessedRecord {
    let at = Utc
        .timestamp_opt(1_700_000_000 + secs, 0)
        .single()
        .unwrap_or_else(Utc::now);
    ProcessedRecord::new(id, at)
}

/// Run the full dedup store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
/// Ids are prefixed with `prefix` so the suite can share a table with other
/// runs.
///
/// # Errors
///
/// Returns an error if the store fails an operation.
pub async fn run_store_conformance_tests(
    store: &dyn DedupStore,
    prefix: &str,
) -> Result<(), StateError> {
    test_exists_missing(store, prefix).await?;
    test_record_then_exists(store, prefix).await?;
    test_record_is_write_once(store, prefix).await?;
    test_get_round_trips_timestamp(store, prefix).await?;
    test_ids_are_independent(store, prefix).await?;
    Ok(())
}

async fn test_exists_missing(store: &dyn DedupStore, prefix: &str) -> Result<(), StateError> {
    let id = MessageId::new(format!("{prefix}-missing"));
    assert!(!store.exists(&id).await?, "unknown id should not exist");
    assert!(store.get(&id).await?.is_none());
    Ok(())
}

async fn test_record_then_exists(store: &dyn DedupStore, prefix: &str) -> Result<(), StateError> {
    let rec = record_at(&format!("{prefix}-recorded"), 0);
    let created = store.record(&rec).await?;
    assert!(created, "first record should report a new write");
    assert!(store.exists(&rec.message_id).await?);
    Ok(())
}

async fn test_record_is_write_once(store: &dyn DedupStore, prefix: &str) -> Result<(), StateError> {
    let id = format!("{prefix}-twice");
    let first = record_at(&id, 10);
    let second = record_at(&id, 20);

    assert!(store.record(&first).await?);
    let created = store.record(&second).await?;
    assert!(!created, "second record for the same id should be a no-op");

    let stored = store.get(&first.message_id).await?;
    assert_eq!(
        stored.map(|r| r.processed_at),
        Some(first.processed_at),
        "the first record's timestamp should be kept"
    );
    Ok(())
}

async fn test_get_round_trips_timestamp(
    store: &dyn DedupStore,
    prefix: &str,
) -> Result<(), StateError> {
    let rec = record_at(&format!("{prefix}-roundtrip"), 42);
    store.record(&rec).await?;
    let stored = store.get(&rec.message_id).await?;
    assert_eq!(stored, Some(rec));
    Ok(())
}

async fn test_ids_are_independent(store: &dyn DedupStore, prefix: &str) -> Result<(), StateError> {
    let a = record_at(&format!("{prefix}-a"), 0);
    let b = MessageId::new(format!("{prefix}-b"));
    store.record(&a).await?;
    assert!(store.exists(&a.message_id).await?);
    assert!(!store.exists(&b).await?, "recording one id must not mark another");
    Ok(())
}
