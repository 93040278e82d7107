//! In-memory access-control lists.
//!
//! An [`Acl`] is built by [`AclBuilder`](crate::AclBuilder) from persisted
//! policies and handed to callers read-only. Entries can only be appended
//! inside this crate.

use custos_core::{Error, ObjectKey, Permission, Result, SecurityIdentity};
use serde::Serialize;
use std::fmt;

use crate::policy::{AccessPolicy, PolicyId};

/// One grant within an ACL, derived from a persisted access policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessControlEntry {
    granted_policy_id: PolicyId,
    identity: SecurityIdentity,
    permission: Permission,
}

impl AccessControlEntry {
    /// Builds an entry from a persisted policy and its resolved permission.
    ///
    /// Fails with `InvariantViolation` if the policy has no store id.
    pub(crate) fn from_policy(policy: &AccessPolicy, permission: Permission) -> Result<Self> {
        let granted_policy_id = policy.id.ok_or_else(|| {
            Error::invariant(format!(
                "policy for {} on {} has no store id",
                policy.identity,
                policy.object_key()
            ))
        })?;
        Ok(Self {
            granted_policy_id,
            identity: policy.identity.clone(),
            permission,
        })
    }

    /// Id of the access policy this entry came from.
    pub fn granted_policy_id(&self) -> PolicyId {
        self.granted_policy_id
    }

    /// Identity holding the grant.
    pub fn identity(&self) -> &SecurityIdentity {
        &self.identity
    }

    /// Granted permission.
    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Exact match on mask and identity.
    pub fn matches(&self, mask: u32, identity: &SecurityIdentity) -> bool {
        self.permission.mask == mask && &self.identity == identity
    }
}

impl fmt::Display for AccessControlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {} {}",
            self.granted_policy_id,
            self.identity,
            self.permission.pattern(),
            self.permission.name
        )
    }
}

/// The set of entries for exactly one domain object.
///
/// Entry order is policy retrieval order. It does not affect matching but is
/// kept stable so output is reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acl {
    object: ObjectKey,
    entries: Vec<AccessControlEntry>,
}

impl Acl {
    pub(crate) fn new(object: ObjectKey) -> Self {
        Self {
            object,
            entries: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, entry: AccessControlEntry) {
        self.entries.push(entry);
    }

    /// Object this ACL belongs to.
    pub fn object(&self) -> &ObjectKey {
        &self.object
    }

    /// Entries in retrieval order.
    pub fn entries(&self) -> &[AccessControlEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the ACL has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if an entry with exactly this mask and identity exists.
    pub fn contains(&self, mask: u32, identity: &SecurityIdentity) -> bool {
        self.entries.iter().any(|ace| ace.matches(mask, identity))
    }

    /// Returns `true` iff some `(permission, identity)` pair has an exact
    /// matching entry.
    ///
    /// Matching is per declared permission: masks are compared for equality,
    /// never bitwise-combined, and there is no inheritance or wildcard.
    pub fn is_granted(&self, permissions: &[Permission], identities: &[SecurityIdentity]) -> bool {
        permissions.iter().any(|permission| {
            identities
                .iter()
                .any(|identity| self.contains(permission.mask, identity))
        })
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ACL for {} ({} entries)", self.object, self.entries.len())?;
        for ace in &self.entries {
            writeln!(f, "  {ace}")?;
        }
        Ok(())
    }
}
