//! In-memory policy store.

use async_trait::async_trait;
use custos_core::{Error, ObjectKey, Result, SecurityIdentity};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use super::PolicyStore;
use crate::policy::{AccessPolicy, PolicyId};

/// Identity-partitioned policy store held in memory.
///
/// Each partition is a `Vec` in save order. Ids are assigned from a single
/// sequence starting at 1 while the write lock is held, so partition order
/// and id order agree.
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    partitions: RwLock<HashMap<SecurityIdentity, Vec<AccessPolicy>>>,
    last_id: AtomicI64,
}

impl MemoryPolicyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored policies.
    pub async fn len(&self) -> usize {
        self.partitions.read().await.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing has been saved.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// All policies in one identity's partition.
    pub async fn partition(&self, identity: &SecurityIdentity) -> Vec<AccessPolicy> {
        self.partitions
            .read()
            .await
            .get(identity)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn get_for_object(
        &self,
        identity: &SecurityIdentity,
        object: &ObjectKey,
    ) -> Result<Vec<AccessPolicy>> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(identity)
            .map(|policies| {
                policies
                    .iter()
                    .filter(|p| p.applies_to(object))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn save(&self, policy: AccessPolicy) -> Result<PolicyId> {
        if let Some(id) = policy.id {
            return Err(Error::invalid_argument(format!(
                "policy {id} is already persisted"
            )));
        }

        let mut partitions = self.partitions.write().await;
        let id = PolicyId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        partitions
            .entry(policy.identity.clone())
            .or_default()
            .push(policy.with_id(id));
        Ok(id)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
