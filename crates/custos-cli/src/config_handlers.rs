//! Handler functions for config CLI commands.
//!
//! Implements `config path|show|get|set|init` over [`AclConfig`], plus the
//! TOML dotted-key helpers they share.

use crate::cli::ConfigAction;
use custos_core::{AclConfig, Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Config file used when neither `--config` nor `CUSTOS_CONFIG` is given.
pub const DEFAULT_CONFIG_FILE: &str = "custos.toml";

// ============================================================================
// Loading
// ============================================================================

/// Resolves the config file path: the explicit path, or [`DEFAULT_CONFIG_FILE`].
pub fn resolve_config_path(config_path: Option<&str>) -> PathBuf {
    PathBuf::from(config_path.unwrap_or(DEFAULT_CONFIG_FILE))
}

/// Loads the effective configuration.
///
/// An explicitly named file must exist; a missing default file means
/// built-in defaults. Environment overrides are applied last.
pub fn load_config(config_path: Option<&str>) -> Result<AclConfig> {
    let path = resolve_config_path(config_path);
    let config = if path.exists() {
        AclConfig::load(&path)?
    } else if config_path.is_some() {
        return Err(Error::config(format!(
            "Config file does not exist at {}",
            path.display()
        )));
    } else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        AclConfig::default()
    };
    config.apply_env()
}

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
pub fn handle_config_command<W: Write>(
    config_path: Option<&str>,
    action: ConfigAction,
    out: &mut W,
) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path, out),
        ConfigAction::Show => cmd_config_show(config_path, out),
        ConfigAction::Get { key } => cmd_config_get(config_path, &key, out),
        ConfigAction::Set { key, value } => cmd_config_set(config_path, &key, &value, out),
        ConfigAction::Init { file, force } => {
            let target = file.as_deref().or(config_path);
            cmd_config_init(&resolve_config_path(target), force, out)
        }
    }
}

// ============================================================================
// Command handlers
// ============================================================================

/// Show the resolved config file path.
pub fn cmd_config_path<W: Write>(config_path: Option<&str>, out: &mut W) -> Result<()> {
    let path = resolve_config_path(config_path);
    writeln!(out, "{}", path.display())?;
    if !path.exists() {
        eprintln!("(file does not exist, run `custos config init` to create it)");
    }
    Ok(())
}

/// Print the effective configuration as TOML.
pub fn cmd_config_show<W: Write>(config_path: Option<&str>, out: &mut W) -> Result<()> {
    let config = load_config(config_path)?;
    write!(out, "{}", config.to_toml_string()?)?;
    Ok(())
}

/// Get a configuration value by dotted key.
pub fn cmd_config_get<W: Write>(config_path: Option<&str>, key: &str, out: &mut W) -> Result<()> {
    let config = load_config(config_path)?;
    let value = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    match get_nested_value(&value, key) {
        Some(val) => {
            writeln!(out, "{}", format_toml_value(val))?;
            Ok(())
        }
        None => Err(Error::config(format!(
            "Key '{key}' not found in configuration"
        ))),
    }
}

/// Set a value by dotted key in the config file.
///
/// The edited document must still be a valid configuration, otherwise the
/// file is left untouched.
pub fn cmd_config_set<W: Write>(
    config_path: Option<&str>,
    key: &str,
    value: &str,
    out: &mut W,
) -> Result<()> {
    let path = resolve_config_path(config_path);
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `custos config init` first.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path)?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    set_nested_value(&mut doc, key, parse_value(value))?;

    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    AclConfig::from_toml_str(&toml_str)?;
    std::fs::write(&path, toml_str)?;

    writeln!(out, "Set {key} = {value} in {}", path.display())?;
    Ok(())
}

/// Create a default configuration file.
pub fn cmd_config_init<W: Write>(path: &Path, force: bool, out: &mut W) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let toml_str = AclConfig::default().to_toml_string()?;
    std::fs::write(path, &toml_str)?;

    writeln!(out, "Config file created at {}", path.display())?;
    Ok(())
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Navigate a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
pub fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let last = match parts.pop() {
        Some(last) if !last.is_empty() => last,
        _ => return Err(Error::config("Empty key path")),
    };

    let mut current = root;
    for part in parts {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part)
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Parse a string value into a TOML value, auto-detecting the type.
///
/// Priority: bool, then integer, then string.
pub fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => s
            .parse::<i64>()
            .map(toml::Value::Integer)
            .unwrap_or_else(|_| toml::Value::String(s.to_string())),
    }
}

/// Format a TOML value for display on stdout.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
