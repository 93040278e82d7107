//! Permission descriptors and the process-wide permission registry.
//!
//! Permissions are data, not a closed enum: each is a `{name, mask, code}`
//! descriptor held in a [`PermissionRegistry`]. Matching logic only ever
//! compares masks, so adding a permission means adding a table entry.
//!
//! # Usage
//!
//! ```rust
//! use custos_core::{Permission, PermissionRegistry};
//!
//! let registry = PermissionRegistry::builtin();
//! assert_eq!(registry.mask_of("VIEWER").unwrap(), 1);
//! assert_eq!(registry.from_mask(1).unwrap(), Permission::VIEWER);
//! assert!(registry.from_mask(8).is_err());
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{Error, Result};

// ============================================================================
// Permission
// ============================================================================

/// A single named permission bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Permission {
    /// Symbolic name, stored verbatim in access policies.
    pub name: &'static str,
    /// Non-zero bitmask.
    pub mask: u32,
    /// Single character shown in [`Permission::pattern`].
    pub code: char,
}

impl Permission {
    /// Read access to a domain object.
    pub const VIEWER: Permission = Permission::new("VIEWER", 1 << 0, 'V');

    /// Creates a permission descriptor.
    pub const fn new(name: &'static str, mask: u32, code: char) -> Self {
        Self { name, mask, code }
    }

    /// Renders the mask as 32 characters, most significant bit first, with
    /// `.` for clear bits and the permission code for set bits.
    pub fn pattern(&self) -> String {
        (0..32)
            .rev()
            .map(|bit| {
                if self.mask & (1 << bit) != 0 {
                    self.code
                } else {
                    '.'
                }
            })
            .collect()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// PermissionRegistry
// ============================================================================

static BUILTIN: LazyLock<PermissionRegistry> = LazyLock::new(|| PermissionRegistry {
    entries: vec![Permission::VIEWER],
});

/// Read-only bidirectional table between permission names and masks.
///
/// The built-in registry is populated once and shared; it is safe for
/// unsynchronized concurrent reads. Custom registries are validated at
/// construction and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRegistry {
    entries: Vec<Permission>,
}

impl PermissionRegistry {
    /// Builds a registry from a fixed set of permissions.
    ///
    /// Rejects zero masks and duplicate names or masks.
    pub fn new(entries: impl IntoIterator<Item = Permission>) -> Result<Self> {
        let mut registry = Self {
            entries: Vec::new(),
        };
        for permission in entries {
            if permission.mask == 0 {
                return Err(Error::invalid_argument(format!(
                    "permission {} has a zero mask",
                    permission.name
                )));
            }
            if registry.entries.iter().any(|p| p.name == permission.name) {
                return Err(Error::invalid_argument(format!(
                    "permission name {} registered twice",
                    permission.name
                )));
            }
            if registry.entries.iter().any(|p| p.mask == permission.mask) {
                return Err(Error::invalid_argument(format!(
                    "permission mask {} registered twice",
                    permission.mask
                )));
            }
            registry.entries.push(permission);
        }
        Ok(registry)
    }

    /// The process-wide default registry (currently just VIEWER).
    pub fn builtin() -> &'static PermissionRegistry {
        &BUILTIN
    }

    /// Looks up a permission by its exact mask.
    pub fn from_mask(&self, mask: u32) -> Result<Permission> {
        self.entries
            .iter()
            .copied()
            .find(|p| p.mask == mask)
            .ok_or_else(|| Error::unknown_permission(format!("mask {mask}")))
    }

    /// Looks up a permission by its symbolic name.
    pub fn by_name(&self, name: &str) -> Result<Permission> {
        self.entries
            .iter()
            .copied()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::unknown_permission(name))
    }

    /// Mask registered for `name`.
    pub fn mask_of(&self, name: &str) -> Result<u32> {
        self.by_name(name).map(|p| p.mask)
    }

    /// Confirms `permission` is exactly a registered descriptor.
    pub fn validate(&self, permission: &Permission) -> Result<Permission> {
        let registered = self.by_name(permission.name)?;
        if registered.mask != permission.mask {
            return Err(Error::unknown_permission(format!(
                "{} with mask {} (registered mask is {})",
                permission.name, permission.mask, registered.mask
            )));
        }
        Ok(registered)
    }

    /// Iterates registered permissions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.entries.iter()
    }

    /// Number of registered permissions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no permissions are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
