use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracking message processing outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct ConsumerMetrics {
    /// Messages handed to the orchestrator.
    pub received: AtomicU64,
    /// Messages dispatched, recorded and acknowledged.
    pub processed: AtomicU64,
    /// Messages acknowledged without dispatch because a record existed.
    pub already_processed: AtomicU64,
    /// Dispatches the endpoint answered with a non-success status.
    pub dispatch_rejected: AtomicU64,
    /// Dispatches that never produced a response.
    pub transport_failures: AtomicU64,
    /// Messages that ended in the failed state, for any reason.
    pub failed: AtomicU64,
}

impl ConsumerMetrics {
    pub fn increment_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_already_processed(&self) {
        self.already_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dispatch_rejected(&self) {
        self.dispatch_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_transport_failures(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            already_processed: self.already_processed.load(Ordering::Relaxed),
            dispatch_rejected: self.dispatch_rejected.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`ConsumerMetrics`] at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub processed: u64,
    pub already_processed: u64,
    pub dispatch_rejected: u64,
    pub transport_failures: u64,
    pub failed: u64,
}
