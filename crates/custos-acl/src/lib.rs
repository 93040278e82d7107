//! # custos-acl
//!
//! ACL resolution engine for Custos.
//!
//! This crate turns identity-partitioned access policies into per-object
//! access-control lists:
//! - Policy storage abstraction with strongly-consistent per-identity reads
//! - Concurrent fan-out/gather across a candidate identity set
//! - Grouping of policies into one ACL per object
//! - Grants with duplicate detection
//! - Exact-match permission checks and fail-closed enforcement

#![doc = include_str!("../README.md")]

pub mod acl;
pub mod builder;
pub mod enforcement;
pub mod policy;
pub mod service;
pub mod store;

pub use acl::{AccessControlEntry, Acl};
pub use builder::AclBuilder;
pub use enforcement::{AccessGuard, Principal};
pub use policy::{AccessPolicy, PolicyId};
pub use service::AclService;
pub use store::{FilePolicyStore, MemoryPolicyStore, PolicyStore, create_policy_store};

pub use custos_core::{Error, Result};
