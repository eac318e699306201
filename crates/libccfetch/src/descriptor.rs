use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    client::Client,
    config::{Clock, FetchConfig},
    error::{FetchError, Result},
};

/// URL scheme routed to the clearcase fetcher. Also names the working
/// directory inside the download cache.
pub const SCHEME: &str = "ccrc";

/// Label fragment marking a floating, non-reproducible revision.
pub const FLOATING_LABEL: &str = "LATEST";

/// Prefix shared by every identifier.
const IDENTIFIER_PREFIX: &str = "clearcase";

/// Characters treated as path separators in vob, module and label values.
const SEPARATORS: [char; 2] = ['/', '\\'];

/// Transport used to reach the CCRC server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    #[default]
    Https,
}

impl Protocol {
    /// Parse the `protocol` parameter of the fetch location `url`.
    fn from_param(value: &str, url: &str) -> Result<Self> {
        match value {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(FetchError::Parameter {
                url: url.to_string(),
                message: format!("Invalid protocol type '{other}'"),
            }),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Https => f.write_str("https"),
        }
    }
}

/// Replace every path separator in `value` with a dot, keeping distinct
/// labels like `a/b` and `ab` apart.
fn dot_separators(value: &str) -> String {
    value
        .chars()
        .map(|c| if SEPARATORS.contains(&c) { '.' } else { c })
        .collect()
}

/// Drop the leading separator of a vob or module path and dot the rest, so
/// `/a/b` becomes `a.b` while `/ab` stays `ab`.
fn flatten_path(value: &str) -> String {
    dot_separators(value.strip_prefix(&SEPARATORS[..]).unwrap_or(value))
}

/// Compute the filesystem-safe identifier for a (vob, module, label) triple.
///
/// The result is a pure function of its inputs and never contains a path
/// separator, so it can be used directly as a file name.
pub fn identifier(vob: &str, module: &str, label: &str) -> String {
    format!(
        "{IDENTIFIER_PREFIX}-{}{}-{}",
        flatten_path(vob),
        flatten_path(module),
        dot_separators(label)
    )
}

/// Build the per-invocation view name for an identifier.
pub fn view_name(identifier: &str, timestamp: &str) -> String {
    format!("{identifier}-view{timestamp}")
}

/// Everything the fetcher knows about one fetch invocation.
///
/// Built once from the fetch location, its parameters and the process
/// configuration. Only the identifier changes afterwards, and only by having a
/// timestamp appended for floating labels.
#[derive(Debug, Clone)]
pub struct FetchDescriptor {
    /// Server host name.
    pub host: String,
    /// Server path (e.g. `/ccrc`).
    pub path: String,
    /// Transport to the server.
    pub protocol: Protocol,
    /// VOB to load, with a leading `/`.
    pub vob: String,
    /// Module inside the VOB, with a leading `/`, or empty.
    pub module: String,
    /// Revision label selected by the generated config spec.
    pub label: String,
    /// Config spec text replacing the generated one.
    pub custom_config_spec: Option<String>,
    /// Client program used for every command.
    pub client: Client,
    /// Filesystem-safe cache identifier.
    identifier: String,
    /// Unique view tag for this invocation.
    view_name: String,
    /// Download cache directory.
    download_dir: PathBuf,
}

impl FetchDescriptor {
    /// Build a descriptor from the fetch location and its parameter map.
    ///
    /// Recognised parameters are `protocol` (`http` or `https`, default
    /// `https`), `vob` (required) and `module` (optional).
    pub fn new(
        host: &str,
        path: &str,
        params: &BTreeMap<String, String>,
        config: &FetchConfig,
        client: Client,
        clock: &dyn Clock,
    ) -> Result<Self> {
        let url = format!("{SCHEME}://{host}{path}");

        let protocol = match params.get("protocol") {
            Some(value) => Protocol::from_param(value, &url)?,
            None => Protocol::default(),
        };

        let vob = params
            .get("vob")
            .cloned()
            .ok_or_else(|| FetchError::MissingParameter {
                name: "vob".to_string(),
                message: format!("{url}: vob must be defined so the fetcher knows what to get"),
            })?;
        if vob.is_empty() || !vob.starts_with('/') {
            return Err(FetchError::Parameter {
                url,
                message: format!("vob '{vob}' must be a non-empty name with a leading '/'"),
            });
        }

        config.validate_label(&url)?;

        let module = params.get("module").cloned().unwrap_or_default();
        let label = config.label.clone();
        let identifier = identifier(&vob, &module, &label);
        let view_name = view_name(&identifier, &clock.timestamp());

        let descriptor = Self {
            host: host.to_string(),
            path: path.to_string(),
            protocol,
            vob,
            module,
            label,
            custom_config_spec: config.custom_config_spec.clone(),
            client,
            identifier,
            view_name,
            download_dir: config.download_dir.clone(),
        };
        descriptor.log_fields();
        Ok(descriptor)
    }

    /// Emit every derived value at debug level.
    fn log_fields(&self) {
        debug!(host = %self.host, path = %self.path, server = %self.server(), "clearcase server");
        debug!(
            proto = %self.protocol,
            vob = %self.vob,
            module = %self.module,
            label = %self.label,
            client = %self.client.variant,
            program = %self.client.program.display(),
            "clearcase descriptor"
        );
        debug!(
            ccasedir = %self.work_dir().display(),
            viewdir = %self.view_dir().display(),
            viewname = %self.view_name,
            configspecfile = %self.config_spec_file().display(),
            localfile = %self.archive_path().display(),
            "clearcase paths"
        );
    }

    /// Location string used in diagnostics.
    pub fn url(&self) -> String {
        format!("{SCHEME}://{}{}", self.host, self.path)
    }

    /// Server address passed to the remote client.
    pub fn server(&self) -> String {
        format!("{}://{}{}", self.protocol, self.host, self.path)
    }

    /// The current cache identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The view tag for this invocation.
    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    /// Download cache directory.
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Directory holding views and config spec files.
    pub fn work_dir(&self) -> PathBuf {
        self.download_dir.join(SCHEME)
    }

    /// Root of this invocation's view.
    pub fn view_dir(&self) -> PathBuf {
        self.work_dir().join(&self.view_name)
    }

    /// File name of the config spec, both in the work dir and inside the view.
    pub fn config_spec_name(&self) -> String {
        format!("{}-config-spec", self.identifier)
    }

    /// Config spec file in the work dir.
    pub fn config_spec_file(&self) -> PathBuf {
        self.work_dir().join(self.config_spec_name())
    }

    /// File name of the produced archive.
    pub fn archive_name(&self) -> String {
        format!("{}.tar.gz", self.identifier)
    }

    /// Where the produced archive lives.
    pub fn archive_path(&self) -> PathBuf {
        self.download_dir.join(self.archive_name())
    }

    /// Advisory lock file guarding this identifier's archive.
    pub fn lock_path(&self) -> PathBuf {
        self.work_dir().join(format!("{}.lock", self.identifier))
    }

    /// Whether the label or custom config spec selects a floating revision.
    pub fn is_floating(&self) -> bool {
        self.label.contains(FLOATING_LABEL)
            || self
                .custom_config_spec
                .as_deref()
                .is_some_and(|spec| spec.contains(FLOATING_LABEL))
    }

    /// Append a timestamp to the identifier so the archive can never be
    /// mistaken for a cached one.
    pub(crate) fn append_timestamp(&mut self, timestamp: &str) {
        self.identifier.push('-');
        self.identifier.push_str(timestamp);
    }
}
