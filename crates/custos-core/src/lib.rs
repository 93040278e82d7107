//! Custos core: identities, permissions and the shared error type.
//!
//! This crate provides the leaf types used across all Custos crates.
//! It has no internal Custos dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`identity`]: Security identities (users and roles)
//! - [`object`]: Domain object references
//! - [`permission`]: Permission descriptors and the registry
//! - [`config`]: Engine configuration

#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod identity;
pub mod object;
pub mod permission;

// Re-export key types at crate root for convenience
pub use config::{AclConfig, StoreConfig};
pub use error::{Error, Result};
pub use identity::{IdentityKind, SecurityIdentity, display_identities};
pub use object::ObjectKey;
pub use permission::{Permission, PermissionRegistry};
