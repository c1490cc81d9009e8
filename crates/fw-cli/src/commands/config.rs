//! Config command implementations

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success, print_warning};
use fw_core::config::{self, ConfigFile};

fn resolve_path(config_path: Option<&PathBuf>) -> PathBuf {
    config_path
        .cloned()
        .unwrap_or_else(config::default_config_path)
}

/// Load the effective configuration.
///
/// An explicit `--config` path must load; the default file is optional and
/// falls back to defaults when unreadable. `endpoint` overrides the file.
pub fn load_settings(config_path: Option<&PathBuf>, endpoint: Option<&str>) -> Result<ConfigFile> {
    let mut settings: ConfigFile = match config_path {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                config::load_config(&default_path).unwrap_or_else(|e| {
                    tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
                    ConfigFile::default()
                })
            } else {
                ConfigFile::default()
            }
        }
    };

    if let Some(endpoint) = endpoint {
        settings.client.endpoint = endpoint.to_string();
    }
    Ok(settings)
}

/// Show the effective configuration
pub fn config_show(config_path: Option<&PathBuf>, settings: &ConfigFile) -> Result<()> {
    let path = resolve_path(config_path);

    if path.exists() {
        print_info(&format!("Configuration file: {:?}", path));
    } else {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Showing defaults. Run 'formwright config init' to create one");
    }
    println!();

    let content =
        toml::to_string_pretty(settings).with_context(|| "Failed to serialize configuration")?;
    println!("{}", content);

    Ok(())
}

/// Print one value of the effective configuration, e.g. `env.settle_delay`
pub fn config_get(settings: &ConfigFile, key: &str) -> Result<()> {
    let root = toml::Value::try_from(settings).with_context(|| "Failed to serialize configuration")?;

    let mut current = &root;
    for part in key.split('.') {
        current = match current {
            toml::Value::Table(t) => t.get(part),
            _ => None,
        }
        .ok_or_else(|| anyhow::anyhow!("Key not found: {}", key))?;
    }

    match current {
        toml::Value::String(s) => println!("{}", s),
        toml::Value::Table(_) => println!("{}", toml::to_string_pretty(current)?),
        other => println!("{}", other),
    }

    Ok(())
}

/// Write a configuration file holding the defaults
pub fn config_init(config_path: Option<&PathBuf>, force: bool) -> Result<()> {
    let path = resolve_path(config_path);

    if path.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", path));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    config::save_config(&path, &ConfigFile::default())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    print_success(&format!("Created configuration file: {:?}", path));

    Ok(())
}

/// Print the configuration file path
pub fn config_path(config_path: Option<&PathBuf>) {
    println!("{}", resolve_path(config_path).display());
}
