use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};

/// Placeholder label used when no revision was configured.
pub const INVALID_LABEL: &str = "INVALID";

/// Format of generated build timestamps (`YYYYmmddHHMMSS`).
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Process-scoped configuration shared by every fetch component.
///
/// Values normally come from a TOML file, with command-line flags layered on
/// top by the caller. Nothing here is read from ambient process state; the
/// fetcher only sees what is passed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Revision label to fetch (e.g. `REL_1.0` or `/main/LATEST`).
    pub label: String,
    /// Config spec text replacing the generated one.
    pub custom_config_spec: Option<String>,
    /// Download cache directory. Archives land here, views under `ccrc/`.
    pub download_dir: PathBuf,
    /// Explicit client program, bypassing `PATH` probing.
    pub command: Option<PathBuf>,
    /// Fixed build timestamp. A fresh local-time stamp is used when unset.
    pub timestamp: Option<String>,
    /// Refuse every command that would reach the server.
    pub no_network: bool,
    /// When non-empty, only these hosts may be contacted.
    pub allowed_hosts: Vec<String>,
    /// Serialize fetches of the same identifier with an advisory lock file.
    pub lock_cache: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            label: INVALID_LABEL.to_string(),
            custom_config_spec: None,
            download_dir: PathBuf::from("downloads"),
            command: None,
            timestamp: None,
            no_network: false,
            allowed_hosts: Vec::new(),
            lock_cache: true,
        }
    }
}

impl FetchConfig {
    /// Load a configuration file, filling unspecified keys with defaults.
    pub fn load(path: &Path) -> Result<Self> {
        read_config(path).map_err(|e| FetchError::Config(format!("{e:#}")))
    }

    /// Reject the placeholder label before any work starts. `url` names the
    /// fetch location in the error.
    pub fn validate_label(&self, url: &str) -> Result<()> {
        if self.label.trim().is_empty() || self.label == INVALID_LABEL {
            return Err(FetchError::Parameter {
                url: url.to_string(),
                message: "Set a valid label for the clearcase fetcher, e.g. \"/main/LATEST\" \
                          or any other label of your choice"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Build the timestamp source implied by this configuration.
    pub fn clock(&self) -> Box<dyn Clock> {
        match &self.timestamp {
            Some(stamp) => Box::new(FixedClock(stamp.clone())),
            None => Box::new(SystemClock),
        }
    }
}

/// Read and parse a TOML configuration file.
fn read_config(path: &Path) -> anyhow::Result<FetchConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Source of the timestamps that make view names unique.
pub trait Clock: Send + Sync {
    /// Return the current timestamp as a filename-safe string.
    fn timestamp(&self) -> String;
}

/// Clock backed by the local wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp(&self) -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Clock that always reports the same build timestamp.
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn timestamp(&self) -> String {
        self.0.clone()
    }
}
