use std::{io, path::PathBuf, result::Result as StdResult};
use thiserror::Error;

/// Custom Result type for fetch operations.
pub type Result<T> = StdResult<T, FetchError>;

/// Remediation appended to `mkview` failures caused by an unauthenticated remote client.
pub const LOGIN_HINT: &str = "Call `rcleartool login` in your console to authenticate to the \
                              clearcase server before fetching.";

/// Error signature printed by `rcleartool` when the session is not authenticated.
pub const AUTH_FAILURE_SIGNATURE: &str = "CRCLI2008E";

/// Fetch-specific error types
#[derive(Error, Debug)]
pub enum FetchError {
    /// A fetch parameter was present but invalid.
    #[error("Parameter error: {message} ({url})")]
    Parameter {
        /// Location of the fetch descriptor the parameter belongs to.
        url: String,
        /// Human-readable error description.
        message: String,
    },

    /// A required fetch parameter was not supplied.
    #[error("Missing parameter '{name}': {message}")]
    MissingParameter {
        /// Name of the missing parameter.
        name: String,
        /// Human-readable error description.
        message: String,
    },

    /// The network policy refused to let a command reach the server.
    #[error("Network access disabled: {command} ({url})")]
    NetworkAccess {
        /// The command that would have accessed the network.
        command: String,
        /// Server address the command targets.
        url: String,
    },

    /// A clearcase client command failed.
    #[error("Command failed: {command}\n{message}")]
    Command {
        /// The rendered command line.
        command: String,
        /// Output or diagnostic text reported by the failing command.
        message: String,
    },

    /// Packaging the view into an archive failed.
    #[error("Archive error for {path}: {message}")]
    Archive {
        /// Archive path that was being written.
        path: PathBuf,
        /// Human-readable error description.
        message: String,
    },

    /// The fetcher was driven in a way its own contract forbids.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(String),

    /// An underlying I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl FetchError {
    /// Return the recommended process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Parameter { .. } | Self::MissingParameter { .. } => 2,
            Self::Config(_) => 2,
            Self::NetworkAccess { .. } => 3,
            Self::Command { .. } => 4,
            Self::Archive { .. } => 5,
            Self::Internal(_) => 70,
            Self::IoError(_) => 1,
        }
    }

    /// Whether this error carries the remote client's authentication-failure signature.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Command { message, .. } if message.contains(AUTH_FAILURE_SIGNATURE))
    }

    /// Rewrap an authentication failure with the login remediation, leaving
    /// every other error untouched.
    pub(crate) fn with_login_hint(self) -> Self {
        if !self.is_auth_failure() {
            return self;
        }
        match self {
            Self::Command { command, message } => Self::Command {
                command,
                message: format!("{message}\n{LOGIN_HINT}\n"),
            },
            other => other,
        }
    }
}
