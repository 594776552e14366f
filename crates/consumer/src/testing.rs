//! Recording test doubles for the orchestrator's collaborators.
//!
//! Each double records the calls it receives and can be told to fail, so
//! tests can assert both the outcome and which side effects happened.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use seedbomb_core::{AckToken, Credential, DispatchRequest, DispatchResult, MessageId, ProcessedRecord};
use seedbomb_provider::{
    AckError, ActionDispatcher, CredentialError, CredentialProvider, MessageAcknowledger,
};
use seedbomb_state::{DedupStore, StateError};
use seedbomb_state_memory::MemoryDedupStore;

/// A [`MemoryDedupStore`] with switchable failures.
#[derive(Debug, Default)]
pub struct FlakyDedupStore {
    inner: MemoryDedupStore,
    fail_exists: AtomicBool,
    fail_records: AtomicBool,
    hide_from_exists: AtomicBool,
}

impl FlakyDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `exists` return `StateError::Connection`.
    pub fn fail_exists(&self, fail: bool) {
        self.fail_exists.store(fail, Ordering::SeqCst);
    }

    /// Make `record` return `StateError::Connection`.
    pub fn fail_records(&self, fail: bool) {
        self.fail_records.store(fail, Ordering::SeqCst);
    }

    /// Make `exists` report `false` for every id, simulating a record written
    /// by a concurrent delivery between the check and the write.
    pub fn hide_from_exists(&self, hide: bool) {
        self.hide_from_exists.store(hide, Ordering::SeqCst);
    }

    /// Number of records held.
    pub fn record_count(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl DedupStore for FlakyDedupStore {
    async fn exists(&self, id: &MessageId) -> Result<bool, StateError> {
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(StateError::Connection("injected exists failure".into()));
        }
        if self.hide_from_exists.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.inner.exists(id).await
    }

    async fn record(&self, record: &ProcessedRecord) -> Result<bool, StateError> {
        if self.fail_records.load(Ordering::SeqCst) {
            return Err(StateError::Connection("injected record failure".into()));
        }
        self.inner.record(record).await
    }

    async fn get(&self, id: &MessageId) -> Result<Option<ProcessedRecord>, StateError> {
        self.inner.get(id).await
    }
}

/// Hands out the same token on every fetch.
#[derive(Debug)]
pub struct StaticCredentialProvider {
    token: String,
    fail: AtomicBool,
    fetches: AtomicUsize,
}

impl StaticCredentialProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            fail: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Make `fetch` return `CredentialError::Unavailable`.
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of `fetch` calls, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn fetch(&self) -> Result<Credential, CredentialError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CredentialError::Unavailable("injected fetch failure".into()));
        }
        Ok(Credential::new(self.token.clone()))
    }
}

/// A dispatch observed by [`ScriptedDispatcher`].
#[derive(Debug, Clone)]
pub struct DispatchCall {
    pub request: DispatchRequest,
    pub token: String,
}

/// Returns queued results first, then a fixed default.
#[derive(Debug)]
pub struct ScriptedDispatcher {
    script: Mutex<VecDeque<DispatchResult>>,
    default: DispatchResult,
    calls: Mutex<Vec<DispatchCall>>,
}

impl ScriptedDispatcher {
    /// A dispatcher that returns `result` for every call.
    pub fn always(result: DispatchResult) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: result,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a one-shot result ahead of the default.
    pub fn push(&self, result: DispatchResult) {
        self.script
            .lock()
            .expect("script mutex poisoned")
            .push_back(result);
    }

    /// All dispatches received so far.
    pub fn calls(&self) -> Vec<DispatchCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

impl ActionDispatcher for ScriptedDispatcher {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "scripted"
    }

    #[allow(clippy::unused_async)]
    async fn dispatch(&self, request: &DispatchRequest, credential: &Credential) -> DispatchResult {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(DispatchCall {
                request: request.clone(),
                token: credential.token().to_owned(),
            });
        self.script
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| self.default.clone())
    }
}

/// Records acknowledged tokens; can fail a number of upcoming calls.
#[derive(Debug, Default)]
pub struct RecordingAcknowledger {
    acked: Mutex<Vec<String>>,
    failures_left: AtomicUsize,
}

impl RecordingAcknowledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` calls with `AckError::Connection`.
    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// Tokens acknowledged successfully, in order.
    pub fn acked(&self) -> Vec<String> {
        self.acked.lock().expect("acked mutex poisoned").clone()
    }
}

#[async_trait]
impl MessageAcknowledger for RecordingAcknowledger {
    async fn acknowledge(&self, token: &AckToken) -> Result<(), AckError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(AckError::Connection("injected ack failure".into()));
        }
        self.acked
            .lock()
            .expect("acked mutex poisoned")
            .push(token.as_str().to_owned());
        Ok(())
    }
}
