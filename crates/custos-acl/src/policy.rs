//! Persisted access policies.

use custos_core::{ObjectKey, Permission, SecurityIdentity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of an access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(i64);

impl PolicyId {
    /// Wraps a raw store identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PolicyId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One persisted grant of a permission to a security identity on a domain
/// object.
///
/// Policies are partitioned by `identity`: every read filtered to a single
/// identity is strongly consistent. `(object_type, object_id)` are the
/// within-partition filter. Policies are append-only; the engine never
/// mutates or deletes one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Assigned by the store on first save. `None` means not yet persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PolicyId>,

    /// Partition key.
    pub identity: SecurityIdentity,

    /// Domain type of the protected object.
    pub object_type: String,

    /// Identifier of the protected object.
    pub object_id: i64,

    /// Permission name as registered in the permission registry.
    pub permission: String,
}

impl AccessPolicy {
    /// Creates an unsaved policy granting `permission` to `identity` on
    /// `object`.
    pub fn new(identity: SecurityIdentity, object: &ObjectKey, permission: &Permission) -> Self {
        Self {
            id: None,
            identity,
            object_type: object.object_type.clone(),
            object_id: object.object_id,
            permission: permission.name.to_string(),
        }
    }

    /// Object this policy applies to.
    pub fn object_key(&self) -> ObjectKey {
        ObjectKey::new(self.object_type.clone(), self.object_id)
    }

    /// Returns `true` if this policy applies to `object`.
    pub fn applies_to(&self, object: &ObjectKey) -> bool {
        self.object_id == object.object_id && self.object_type == object.object_type
    }

    /// Returns `true` once the store has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns a copy carrying the store-assigned id.
    pub fn with_id(mut self, id: PolicyId) -> Self {
        self.id = Some(id);
        self
    }
}
