//! # custos-cli
//!
//! Administration CLI for the Custos ACL engine.
//!
//! - Granting permissions (`custos grant`)
//! - Inspecting resolved ACLs (`custos read`, `custos check`)
//! - Listing registered permissions
//! - Managing the TOML configuration file

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_handlers;

use custos_core::{ObjectKey, Result};
use std::io::Write;

pub use cli::{Args, Command, ConfigAction};
pub use config_handlers::load_config;

/// Runs a parsed command line, writing reports to `out`.
///
/// Returns `false` only when `check` denies access.
pub async fn run<W: Write>(args: Args, out: &mut W) -> Result<bool> {
    let config_path = args.config.as_deref();
    let command = match args.command {
        Command::Config { action } => {
            config_handlers::handle_config_command(config_path, action, out)?;
            return Ok(true);
        }
        other => other,
    };

    let config = load_config(config_path)?;
    let service = commands::build_service(&config).await?;

    match command {
        Command::Grant {
            identity,
            object_type,
            object_id,
            permission,
        } => {
            let object = ObjectKey::new(object_type, object_id);
            commands::cmd_grant(&service, &identity, &object, &permission, out).await?;
        }
        Command::Read {
            object_type,
            object_id,
            identities,
            json,
        } => {
            let object = ObjectKey::new(object_type, object_id);
            commands::cmd_read(&service, &object, &identities, json, out).await?;
        }
        Command::Check {
            object_type,
            object_id,
            identities,
            permissions,
        } => {
            let object = ObjectKey::new(object_type, object_id);
            return commands::cmd_check(&service, &object, &identities, &permissions, out).await;
        }
        Command::Permissions => commands::cmd_permissions(&service, out)?,
        Command::Config { .. } => {}
    }
    Ok(true)
}
