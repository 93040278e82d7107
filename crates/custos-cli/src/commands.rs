//! Handlers for the ACL commands.
//!
//! Each handler writes its report to `out` so the binary can pass stdout and
//! tests can pass a buffer.

use custos_acl::{AclService, create_policy_store};
use custos_core::{AclConfig, Error, ObjectKey, Permission, Result, SecurityIdentity};
use std::io::Write;

/// Opens the configured store and wraps it in a service.
pub async fn build_service(config: &AclConfig) -> Result<AclService> {
    let store = create_policy_store(&config.store).await?;
    if store.name() == "memory" {
        tracing::warn!("Using the memory policy store; grants last only for this process");
    }
    Ok(AclService::with_config(store, config))
}

fn parse_identities(identities: &[String]) -> Result<Vec<SecurityIdentity>> {
    identities
        .iter()
        .map(|s| SecurityIdentity::parse(s))
        .collect()
}

fn parse_permissions(service: &AclService, names: &[String]) -> Result<Vec<Permission>> {
    names
        .iter()
        .map(|name| service.registry().by_name(name))
        .collect()
}

/// `custos grant`
pub async fn cmd_grant<W: Write>(
    service: &AclService,
    identity: &str,
    object: &ObjectKey,
    permission: &str,
    out: &mut W,
) -> Result<()> {
    let identity = SecurityIdentity::parse(identity)?;
    let permission = service.registry().by_name(permission)?;
    let id = service.insert_ace(&identity, object, &permission).await?;
    writeln!(
        out,
        "Granted {permission} on {object} to {identity} (policy #{id})"
    )?;
    Ok(())
}

/// `custos read`
pub async fn cmd_read<W: Write>(
    service: &AclService,
    object: &ObjectKey,
    identities: &[String],
    json: bool,
    out: &mut W,
) -> Result<()> {
    let identities = parse_identities(identities)?;
    let acl = service.read_acl_by_id(object, &identities).await?;
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&acl)?)?;
    } else {
        write!(out, "{acl}")?;
    }
    Ok(())
}

/// `custos check`
///
/// Returns whether access is granted. An object with no visible ACL is
/// denied rather than reported as an error.
pub async fn cmd_check<W: Write>(
    service: &AclService,
    object: &ObjectKey,
    identities: &[String],
    permissions: &[String],
    out: &mut W,
) -> Result<bool> {
    let identities = parse_identities(identities)?;
    let permissions = parse_permissions(service, permissions)?;

    let granted = match service.read_acl_by_id(object, &identities).await {
        Ok(acl) => service.is_granted(&permissions, &identities, &acl),
        Err(Error::NotFound { .. }) => false,
        Err(e) => return Err(e),
    };
    tracing::debug!(object = %object, granted, "Checked access");

    writeln!(out, "{}", if granted { "granted" } else { "denied" })?;
    Ok(granted)
}

/// `custos permissions`
pub fn cmd_permissions<W: Write>(service: &AclService, out: &mut W) -> Result<()> {
    for permission in service.registry().iter() {
        writeln!(
            out,
            "{:<10} {:#06x}  {}",
            permission.name,
            permission.mask,
            permission.pattern()
        )?;
    }
    Ok(())
}
