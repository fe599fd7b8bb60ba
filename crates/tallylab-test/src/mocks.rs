//! Mock collaborators for testing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tallylab_identity::{Identity, IdentityError, IdentityResult, IdentityVerifier};
use tallylab_storage::{Cid, DagStore, StorageError, StorageResult};

/// Mock implementation of [`IdentityVerifier`].
///
/// Each answer is switchable on its own, and either call can be made to fail
/// outright. Calls are recorded in order.
#[derive(Debug, Clone)]
pub struct MockVerifier {
    verify: bool,
    local_key: bool,
    fail_verify: bool,
    fail_local_key: bool,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockVerifier {
    /// A verifier that accepts every identity and holds every key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            verify: true,
            local_key: true,
            fail_verify: false,
            fail_local_key: false,
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reject every identity's signatures.
    #[must_use]
    pub fn rejecting_signatures(mut self) -> Self {
        self.verify = false;
        self
    }

    /// Report no local key for any id.
    #[must_use]
    pub fn without_local_keys(mut self) -> Self {
        self.local_key = false;
        self
    }

    /// Fail every `verify_identity` call with an error.
    #[must_use]
    pub fn failing_verification(mut self) -> Self {
        self.fail_verify = true;
        self
    }

    /// Fail every `has_local_key` call with an error.
    #[must_use]
    pub fn failing_key_lookup(mut self) -> Self {
        self.fail_local_key = true;
        self
    }

    /// Sleep for `delay` before answering either call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls received so far, as `verify:<id>` or `has_key:<id>`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(call);
        }
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityVerifier for MockVerifier {
    async fn verify_identity(&self, identity: &Identity) -> IdentityResult<bool> {
        self.record(format!("verify:{}", identity.id));
        self.pause().await;
        if self.fail_verify {
            return Err(IdentityError::Keystore("injected verification failure".into()));
        }
        Ok(self.verify)
    }

    async fn has_local_key(&self, id: &str) -> IdentityResult<bool> {
        self.record(format!("has_key:{id}"));
        self.pause().await;
        if self.fail_local_key {
            return Err(IdentityError::Keystore("injected keystore failure".into()));
        }
        Ok(self.local_key)
    }
}

/// A [`DagStore`] whose every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingDagStore;

#[async_trait]
impl DagStore for FailingDagStore {
    async fn put(&self, _document: &Value) -> StorageResult<Cid> {
        Err(StorageError::Internal("injected put failure".into()))
    }

    async fn get(&self, _cid: &Cid) -> StorageResult<Value> {
        Err(StorageError::Internal("injected get failure".into()))
    }

    async fn has(&self, _cid: &Cid) -> StorageResult<bool> {
        Err(StorageError::Internal("injected has failure".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::unrelated_identity;

    #[tokio::test]
    async fn test_mock_verifier_switches() {
        let identity = unrelated_identity();

        let accepting = MockVerifier::new();
        assert!(accepting.verify_identity(&identity).await.unwrap());
        assert!(accepting.has_local_key(&identity.id).await.unwrap());
        assert_eq!(accepting.calls().len(), 2);

        let rejecting = MockVerifier::new().rejecting_signatures().without_local_keys();
        assert!(!rejecting.verify_identity(&identity).await.unwrap());
        assert!(!rejecting.has_local_key(&identity.id).await.unwrap());

        let failing = MockVerifier::new().failing_verification().failing_key_lookup();
        assert!(failing.verify_identity(&identity).await.is_err());
        assert!(failing.has_local_key(&identity.id).await.is_err());
    }

    #[tokio::test]
    async fn test_failing_dag_store() {
        let store = FailingDagStore;
        assert!(store.put(&Value::Null).await.is_err());
        assert!(store.get(&Cid::of(b"x")).await.is_err());
        assert!(store.has(&Cid::of(b"x")).await.is_err());
    }
}
