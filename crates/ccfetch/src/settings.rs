use std::{collections::BTreeMap, fs};

use anyhow::Result;
use libccfetch::{FetchConfig, FetchError};

use crate::{
    args::{Cli, Target},
    utils::expand_tilde,
};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CCFETCH_CONFIG";

/// Environment variable overriding the download directory.
pub const DOWNLOAD_DIR_ENV: &str = "CCFETCH_DOWNLOAD_DIR";

/// Build the fetch configuration for this invocation.
///
/// Priority for every value: CLI flag > environment variable > config file >
/// default. `env` looks up environment variables.
pub fn resolve(
    cli: &Cli,
    target: &Target,
    env: impl Fn(&str) -> Option<String>,
) -> Result<FetchConfig> {
    let config_path = cli.config.clone().or_else(|| env(CONFIG_ENV));
    let mut config = match config_path {
        Some(path) => FetchConfig::load(&expand_tilde(&path))?,
        None => FetchConfig::default(),
    };

    if let Some(dir) = &cli.dir {
        config.download_dir = expand_tilde(dir);
    } else if let Some(dir) = env(DOWNLOAD_DIR_ENV) {
        config.download_dir = expand_tilde(&dir);
    }

    if let Some(label) = &target.label {
        config.label.clone_from(label);
    }
    if let Some(path) = &target.config_spec {
        let text = fs::read_to_string(path).map_err(|e| {
            FetchError::Config(format!("Failed to read config spec {}: {e}", path.display()))
        })?;
        config.custom_config_spec = Some(text);
    }
    if let Some(command) = &cli.command {
        config.command = Some(command.clone());
    }
    if let Some(stamp) = &cli.timestamp {
        config.timestamp = Some(stamp.clone());
    }
    config.no_network |= cli.no_network;

    Ok(config)
}

/// The fetch parameter map described by `target`.
pub fn params(target: &Target) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    let entries = [
        ("vob", &target.vob),
        ("module", &target.module),
        ("protocol", &target.protocol),
    ];
    for (key, value) in entries {
        if let Some(value) = value {
            params.insert(key.to_string(), value.clone());
        }
    }
    params
}
