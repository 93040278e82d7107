//! Explicit authorization decision points.
//!
//! [`AccessGuard`] is called by application code before (or right after
//! loading the target of) an operation. Every error on the decision path is
//! turned into `AccessDenied`: the guard fails closed, never open.
//!
//! # Usage
//!
//! ```rust,ignore
//! let guard = AccessGuard::new(service.clone());
//! let principal = Principal::new("alice").with_role("ROLE_USER");
//!
//! guard.require_role(&principal, "ROLE_USER")?;
//! guard
//!     .require_permission_or_owner(&principal, &report, &[Permission::VIEWER], Some(&owner))
//!     .await?;
//! ```

use custos_core::{Error, ObjectKey, Permission, Result, SecurityIdentity};

use crate::service::AclService;

/// An authenticated caller: a user name plus the roles granted to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Login name.
    pub username: String,
    /// Granted roles or authorities.
    pub roles: Vec<String>,
}

impl Principal {
    /// Creates a principal without roles.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: Vec::new(),
        }
    }

    /// Adds a role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Returns `true` if the principal holds `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Candidate identity set: the user identity first, then one identity
    /// per role.
    pub fn identities(&self) -> Result<Vec<SecurityIdentity>> {
        std::iter::once(SecurityIdentity::user(self.username.as_str()))
            .chain(self.roles.iter().map(|r| SecurityIdentity::role(r.as_str())))
            .collect()
    }
}

/// Fail-closed authorization checks backed by an [`AclService`].
#[derive(Debug, Clone)]
pub struct AccessGuard {
    service: AclService,
}

impl AccessGuard {
    /// Creates a guard resolving ACLs through `service`.
    pub fn new(service: AclService) -> Self {
        Self { service }
    }

    /// Allows the call only if the principal holds `role`.
    pub fn require_role(&self, principal: &Principal, role: &str) -> Result<()> {
        if principal.has_role(role) {
            return Ok(());
        }
        tracing::warn!(user = %principal.username, role, "Access denied: missing role");
        Err(Error::access_denied(format!(
            "{} does not hold role {role}",
            principal.username
        )))
    }

    /// Allows the call only if one of the principal's identities holds one
    /// of `permissions` on `object`.
    pub async fn require_permission(
        &self,
        principal: &Principal,
        object: &ObjectKey,
        permissions: &[Permission],
    ) -> Result<()> {
        match self.decide(principal, object, permissions).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::warn!(
                    user = %principal.username,
                    object = %object,
                    "Access denied: no matching entry"
                );
                Err(Error::access_denied(format!(
                    "{} holds none of the required permissions on {object}",
                    principal.username
                )))
            }
            Err(e) => {
                if e.is_fatal() {
                    tracing::error!(
                        user = %principal.username,
                        object = %object,
                        error = %e,
                        "Access denied: ACL resolution failed"
                    );
                } else {
                    tracing::warn!(
                        user = %principal.username,
                        object = %object,
                        error = %e,
                        "Access denied"
                    );
                }
                Err(Error::access_denied(format!(
                    "{} may not access {object}: {e}",
                    principal.username
                )))
            }
        }
    }

    /// Like [`require_permission`](Self::require_permission), but the owner
    /// of the object is always allowed.
    pub async fn require_permission_or_owner(
        &self,
        principal: &Principal,
        object: &ObjectKey,
        permissions: &[Permission],
        owner: Option<&str>,
    ) -> Result<()> {
        if owner == Some(principal.username.as_str()) {
            return Ok(());
        }
        self.require_permission(principal, object, permissions)
            .await
    }

    async fn decide(
        &self,
        principal: &Principal,
        object: &ObjectKey,
        permissions: &[Permission],
    ) -> Result<bool> {
        let identities = principal.identities()?;
        let acl = self.service.read_acl_by_id(object, &identities).await?;
        Ok(self.service.is_granted(permissions, &identities, &acl))
    }
}
