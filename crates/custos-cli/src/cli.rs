//! Command-line argument definitions.

use clap::{Parser, Subcommand};

/// Custos CLI - ACL administration
#[derive(Parser, Debug)]
#[command(name = "custos")]
#[command(author, version, about = "Custos ACL administration tool", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CUSTOS_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Grant a permission to an identity on an object
    Grant {
        /// Security identity, e.g. USER:alice or ROLE:auditor
        #[arg(short, long)]
        identity: String,

        /// Object type, e.g. Report
        #[arg(short = 't', long = "type")]
        object_type: String,

        /// Object id
        #[arg(long = "id")]
        object_id: i64,

        /// Permission name
        #[arg(short, long, default_value = "VIEWER")]
        permission: String,
    },

    /// Show the ACL of an object as seen by a set of identities
    Read {
        /// Object type
        #[arg(short = 't', long = "type")]
        object_type: String,

        /// Object id
        #[arg(long = "id")]
        object_id: i64,

        /// Candidate identities (repeatable)
        #[arg(short, long = "identity", required = true)]
        identities: Vec<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check whether any identity holds any of the permissions
    Check {
        /// Object type
        #[arg(short = 't', long = "type")]
        object_type: String,

        /// Object id
        #[arg(long = "id")]
        object_id: i64,

        /// Candidate identities (repeatable)
        #[arg(short, long = "identity", required = true)]
        identities: Vec<String>,

        /// Permissions to look for (repeatable)
        #[arg(short, long = "permission", default_value = "VIEWER")]
        permissions: Vec<String>,
    },

    /// List registered permissions
    Permissions,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,

    /// Print the effective configuration (file plus environment)
    Show,

    /// Get a value by dotted key, e.g. store.backend
    Get {
        /// Dotted key
        key: String,
    },

    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,

        /// New value
        value: String,
    },

    /// Write a default configuration file
    Init {
        /// Target path (defaults to the resolved config path)
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
