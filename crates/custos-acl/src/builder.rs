//! AclBuilder: groups flat access policies into one ACL per object.
//!
//! The builder is a pure function over its input. It performs no duplicate
//! or conflict detection: historical duplicates may already exist by the time
//! a read happens, so each policy becomes its own entry. Duplicate
//! suppression happens at grant time in [`AclService`](crate::AclService).

use custos_core::{ObjectKey, PermissionRegistry, Result};
use std::collections::BTreeMap;

use crate::acl::{AccessControlEntry, Acl};
use crate::policy::AccessPolicy;

/// Builds per-object ACLs from access policies.
#[derive(Debug, Clone, Copy)]
pub struct AclBuilder<'a> {
    registry: &'a PermissionRegistry,
}

impl<'a> AclBuilder<'a> {
    /// Creates a builder resolving permission names through `registry`.
    pub fn new(registry: &'a PermissionRegistry) -> Self {
        Self { registry }
    }

    /// Groups `policies` by object, preserving input order within each ACL.
    ///
    /// # Errors
    ///
    /// - `UnknownPermission` if a policy names an unregistered permission
    /// - `InvariantViolation` if a policy was never persisted
    pub fn group(&self, policies: &[AccessPolicy]) -> Result<BTreeMap<ObjectKey, Acl>> {
        let mut acls: BTreeMap<ObjectKey, Acl> = BTreeMap::new();

        for policy in policies {
            let permission = self.registry.by_name(&policy.permission)?;
            let entry = AccessControlEntry::from_policy(policy, permission)?;

            let key = policy.object_key();
            acls.entry(key.clone())
                .or_insert_with(|| Acl::new(key))
                .insert(entry);
        }

        Ok(acls)
    }
}
