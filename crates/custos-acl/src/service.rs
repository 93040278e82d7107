//! AclService: the public resolution and grant API.
//!
//! ```rust,ignore
//! let service = AclService::new(Arc::new(MemoryPolicyStore::new()));
//!
//! service.insert_ace(&alice, &report, &Permission::VIEWER).await?;
//! let acl = service.read_acl_by_id(&report, &[alice.clone()]).await?;
//! assert!(service.is_granted(&[Permission::VIEWER], &[alice], &acl));
//! ```

use custos_core::{
    AclConfig, Error, ObjectKey, Permission, PermissionRegistry, Result, SecurityIdentity,
    display_identities,
};
use futures::future::try_join_all;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::acl::Acl;
use crate::builder::AclBuilder;
use crate::policy::{AccessPolicy, PolicyId};
use crate::store::PolicyStore;

/// Resolves ACLs and records grants against a [`PolicyStore`].
///
/// Stateless between calls; cheap to clone.
#[derive(Clone)]
pub struct AclService {
    store: Arc<dyn PolicyStore>,
    registry: Arc<PermissionRegistry>,
    fanout_timeout: Option<Duration>,
}

impl AclService {
    /// Creates a service over `store` with the built-in permission registry
    /// and default configuration.
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self::with_config(store, &AclConfig::default())
    }

    /// Creates a service using the fan-out deadline from `config`.
    pub fn with_config(store: Arc<dyn PolicyStore>, config: &AclConfig) -> Self {
        Self {
            store,
            registry: Arc::new(PermissionRegistry::default()),
            fanout_timeout: config.fanout_timeout(),
        }
    }

    /// Replaces the permission registry.
    pub fn with_registry(mut self, registry: Arc<PermissionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Overrides the fan-out deadline. `None` waits indefinitely.
    pub fn with_fanout_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fanout_timeout = timeout;
        self
    }

    /// Permission registry in use.
    pub fn registry(&self) -> &PermissionRegistry {
        &self.registry
    }

    /// Grants `permission` to `identity` on `object`.
    ///
    /// Reads the identity's partition first (strongly consistent) and refuses
    /// to write if an entry with the same mask and identity already exists.
    /// Concurrent identical grants are not mutually excluded.
    ///
    /// # Errors
    ///
    /// - `UnknownPermission` if `permission` is not registered
    /// - `DuplicateGrant` if the grant already exists; nothing is written
    /// - `InvariantViolation` if the scoped read yields more than one object
    /// - storage errors unchanged
    pub async fn insert_ace(
        &self,
        identity: &SecurityIdentity,
        object: &ObjectKey,
        permission: &Permission,
    ) -> Result<PolicyId> {
        let permission = self.registry.validate(permission)?;

        let existing = self.store.get_for_object(identity, object).await?;
        let mut acls = AclBuilder::new(&self.registry).group(&existing)?;

        if acls.len() > 1 {
            return Err(self.invariant_violation(object, acls.len()));
        }

        if let Some(acl) = acls.remove(object) {
            if acl.contains(permission.mask, identity) {
                tracing::warn!(
                    identity = %identity,
                    object = %object,
                    permission = permission.name,
                    "Refusing duplicate grant"
                );
                return Err(Error::DuplicateGrant {
                    identity: identity.to_string(),
                    object: object.to_string(),
                    permission: permission.name.to_string(),
                });
            }
        } else if !acls.is_empty() {
            return Err(self.invariant_violation(object, acls.len()));
        }

        let id = self
            .store
            .save(AccessPolicy::new(identity.clone(), object, &permission))
            .await?;

        tracing::info!(
            policy_id = %id,
            identity = %identity,
            object = %object,
            permission = permission.name,
            "Granted permission"
        );
        Ok(id)
    }

    /// Resolves the ACL for `object` as seen by `identities`.
    ///
    /// An empty identity set finds no policies and therefore fails with
    /// `NotFound`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no identity holds any grant on the object
    /// - `InvariantViolation` unless exactly one ACL results
    /// - `Timeout` if the fan-out exceeds the configured deadline
    /// - storage errors from any sub-query
    pub async fn read_acl_by_id(
        &self,
        object: &ObjectKey,
        identities: &[SecurityIdentity],
    ) -> Result<Acl> {
        let policies = self.fetch(object, identities).await?;

        if policies.is_empty() {
            return Err(Error::NotFound {
                object: object.to_string(),
                identities: display_identities(identities),
            });
        }

        let mut acls = AclBuilder::new(&self.registry).group(&policies)?;
        if acls.len() != 1 {
            return Err(self.invariant_violation(object, acls.len()));
        }

        acls.remove(object)
            .ok_or_else(|| self.invariant_violation(object, 1))
    }

    /// Resolves ACLs for every object in `objects`.
    ///
    /// All-or-nothing: the first failing object aborts the batch and no
    /// partial map is returned. Duplicate objects are resolved once.
    pub async fn read_acls_by_id(
        &self,
        objects: &[ObjectKey],
        identities: &[SecurityIdentity],
    ) -> Result<BTreeMap<ObjectKey, Acl>> {
        let mut seen = HashSet::new();
        let distinct: Vec<&ObjectKey> = objects.iter().filter(|o| seen.insert(*o)).collect();

        let acls = try_join_all(
            distinct
                .iter()
                .map(|object| self.read_acl_by_id(object, identities)),
        )
        .await?;

        Ok(distinct.into_iter().cloned().zip(acls).collect())
    }

    /// Returns `true` iff `acl` holds an exact entry for some
    /// `(permission, identity)` pair.
    pub fn is_granted(
        &self,
        permissions: &[Permission],
        identities: &[SecurityIdentity],
        acl: &Acl,
    ) -> bool {
        acl.is_granted(permissions, identities)
    }

    async fn fetch(
        &self,
        object: &ObjectKey,
        identities: &[SecurityIdentity],
    ) -> Result<Vec<AccessPolicy>> {
        let query = self.store.get_for_identities(identities, object);
        match self.fanout_timeout {
            Some(deadline) => tokio::time::timeout(deadline, query).await.map_err(|_| {
                tracing::warn!(
                    object = %object,
                    identities = identities.len(),
                    "Policy fan-out timed out"
                );
                Error::Timeout {
                    millis: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                }
            })?,
            None => query.await,
        }
    }

    fn invariant_violation(&self, object: &ObjectKey, found: usize) -> Error {
        tracing::error!(
            object = %object,
            acls = found,
            store = self.store.name(),
            "Query scoped to one object resolved to an unexpected number of ACLs"
        );
        Error::invariant(format!(
            "exactly one ACL expected for {object}, found {found}"
        ))
    }
}

impl std::fmt::Debug for AclService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclService")
            .field("store", &self.store.name())
            .field("fanout_timeout", &self.fanout_timeout)
            .finish()
    }
}
