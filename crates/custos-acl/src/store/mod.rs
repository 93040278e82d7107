//! Policy store trait and factory.
//!
//! This module defines the `PolicyStore` trait that every backing store must
//! satisfy. The engine never talks to storage any other way.
//!
//! # Backends
//!
//! - `MemoryPolicyStore`: identity-partitioned map, for tests and embedding
//! - `FilePolicyStore`: the same model persisted to a JSON file
//!
//! # Consistency
//!
//! Policies are partitioned by security identity. A read scoped to one
//! identity must reflect every earlier write to that identity's partition.
//! Reads across several identities are a fan-out of such reads; see
//! [`fan_out`].
//!
//! # Example
//!
//! ```rust,ignore
//! use custos_acl::store::create_policy_store;
//! use custos_core::StoreConfig;
//!
//! let store = create_policy_store(&StoreConfig::default()).await?;
//! let policies = store.get_for_object(&alice, &report).await?;
//! ```

use async_trait::async_trait;
use custos_core::{Error, ObjectKey, Result, SecurityIdentity, StoreConfig};
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;

use crate::policy::{AccessPolicy, PolicyId};

pub mod file;
pub mod memory;

pub use file::FilePolicyStore;
pub use memory::MemoryPolicyStore;

/// Abstract policy store.
///
/// # Async
///
/// All lookups are async so that implementations backed by remote stores can
/// run the per-identity queries of a fan-out concurrently.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Strongly-consistent read of all policies for one identity on one
    /// object, in partition order.
    async fn get_for_object(
        &self,
        identity: &SecurityIdentity,
        object: &ObjectKey,
    ) -> Result<Vec<AccessPolicy>>;

    /// Union of [`get_for_object`](Self::get_for_object) across `identities`.
    ///
    /// An empty identity set yields an empty result, never every policy.
    async fn get_for_identities(
        &self,
        identities: &[SecurityIdentity],
        object: &ObjectKey,
    ) -> Result<Vec<AccessPolicy>> {
        fan_out(self, identities, object).await
    }

    /// Persists a new policy and returns its store-assigned id.
    ///
    /// Performs exactly one write with no deduplication.
    async fn save(&self, policy: AccessPolicy) -> Result<PolicyId>;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}

/// Runs one [`PolicyStore::get_for_object`] per distinct identity
/// concurrently and gathers the results.
///
/// Results are concatenated in identity order; each sub-query keeps its own
/// order. The first failing sub-query fails the whole fan-out and drops every
/// query still in flight, so a missing partition can never silently
/// under-report grants.
pub async fn fan_out<S>(
    store: &S,
    identities: &[SecurityIdentity],
    object: &ObjectKey,
) -> Result<Vec<AccessPolicy>>
where
    S: PolicyStore + ?Sized,
{
    let distinct = distinct_identities(identities);
    if distinct.is_empty() {
        return Ok(Vec::new());
    }

    tracing::debug!(
        store = store.name(),
        object = %object,
        identities = distinct.len(),
        "Fanning out policy lookups"
    );

    let partials = try_join_all(
        distinct
            .iter()
            .map(|identity| store.get_for_object(identity, object)),
    )
    .await?;

    Ok(partials.into_iter().flatten().collect())
}

/// De-duplicates identities, first occurrence wins.
fn distinct_identities(identities: &[SecurityIdentity]) -> Vec<&SecurityIdentity> {
    let mut seen = HashSet::new();
    identities
        .iter()
        .filter(|identity| seen.insert(*identity))
        .collect()
}

/// Create a policy store based on configuration.
///
/// # Errors
///
/// Returns a `Config` error for an unknown backend or a file backend without
/// a path, and propagates failures opening the file store.
pub async fn create_policy_store(config: &StoreConfig) -> Result<Arc<dyn PolicyStore>> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryPolicyStore::new())),
        "file" => {
            let path = config
                .path
                .as_deref()
                .ok_or_else(|| Error::config("file store backend requires store.path"))?;
            Ok(Arc::new(FilePolicyStore::open(path).await?))
        }
        other => Err(Error::config(format!(
            "unknown store backend '{other}' (expected memory or file)"
        ))),
    }
}
