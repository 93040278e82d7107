//! Common test utilities for custos-acl integration tests.

use async_trait::async_trait;
use custos_acl::{AccessPolicy, AclService, MemoryPolicyStore, PolicyId, PolicyStore};
use custos_core::{Error, ObjectKey, Result, SecurityIdentity};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Test harness bundling a memory store with a service over it.
pub struct TestHarness {
    /// Backing store, for inspecting what was persisted
    pub store: Arc<MemoryPolicyStore>,
    /// Service under test
    pub service: AclService,
}

impl TestHarness {
    /// Creates a harness over an empty memory store.
    pub fn new() -> Self {
        let store = Arc::new(MemoryPolicyStore::new());
        let service = AclService::new(store.clone());
        Self { store, service }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a canonical identity.
pub fn sid(canonical: &str) -> SecurityIdentity {
    SecurityIdentity::parse(canonical).expect("valid identity")
}

/// The `Report:42` object used across scenarios.
pub fn report_42() -> ObjectKey {
    ObjectKey::new("Report", 42)
}

/// Store wrapper whose lookups fail for one identity.
pub struct FailingStore {
    pub inner: MemoryPolicyStore,
    pub broken: SecurityIdentity,
}

#[async_trait]
impl PolicyStore for FailingStore {
    async fn get_for_object(
        &self,
        identity: &SecurityIdentity,
        object: &ObjectKey,
    ) -> Result<Vec<AccessPolicy>> {
        if identity == &self.broken {
            return Err(Error::storage(format!("partition {identity} unavailable")));
        }
        self.inner.get_for_object(identity, object).await
    }

    async fn save(&self, policy: AccessPolicy) -> Result<PolicyId> {
        self.inner.save(policy).await
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Store wrapper whose lookups stall for one identity.
///
/// `finished` counts slow lookups that ran to completion; a cancelled lookup
/// never increments it.
pub struct SlowStore {
    pub inner: MemoryPolicyStore,
    pub slow: SecurityIdentity,
    pub delay: Duration,
    pub finished: AtomicUsize,
}

impl SlowStore {
    pub fn new(slow: SecurityIdentity, delay: Duration) -> Self {
        Self {
            inner: MemoryPolicyStore::new(),
            slow,
            delay,
            finished: AtomicUsize::new(0),
        }
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PolicyStore for SlowStore {
    async fn get_for_object(
        &self,
        identity: &SecurityIdentity,
        object: &ObjectKey,
    ) -> Result<Vec<AccessPolicy>> {
        if identity == &self.slow {
            tokio::time::sleep(self.delay).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.get_for_object(identity, object).await
    }

    async fn save(&self, policy: AccessPolicy) -> Result<PolicyId> {
        self.inner.save(policy).await
    }

    fn name(&self) -> &str {
        "slow"
    }
}
