use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::error::{FetchError, Result};

/// Program name of the locally installed clearcase client.
pub const LOCAL_CLIENT: &str = "cleartool";
/// Program name of the remote (CCRC) clearcase client.
pub const REMOTE_CLIENT: &str = "rcleartool";

/// The two interchangeable clearcase clients the fetcher can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientVariant {
    /// `cleartool`: talks to a local installation and needs snapshot views.
    Local,
    /// `rcleartool`: talks to a CCRC server named on every command.
    Remote,
}

impl ClientVariant {
    /// Classify a client program by its file name.
    pub fn for_program(program: &Path) -> Self {
        let is_remote = program
            .file_name()
            .map(|name| name.to_string_lossy().contains(REMOTE_CLIENT))
            .unwrap_or(false);
        if is_remote { Self::Remote } else { Self::Local }
    }
}

impl fmt::Display for ClientVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// A resolved client program together with the variant that governs how
/// commands are built for it. Selected once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    /// Which command dialect the program speaks.
    pub variant: ClientVariant,
    /// Program to execute.
    pub program: PathBuf,
}

impl Client {
    /// Build a client for an explicit program path.
    pub fn from_program(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        Self {
            variant: ClientVariant::for_program(&program),
            program,
        }
    }

    /// Select the client to use.
    ///
    /// An explicit `command` override always wins. Otherwise `cleartool` is
    /// preferred, falling back to `rcleartool`.
    pub fn detect(command: Option<&Path>) -> Result<Self> {
        Self::detect_with(command, |name| which::which(name).ok())
    }

    /// Select the client, resolving program names through `find`.
    fn detect_with(
        command: Option<&Path>,
        find: impl Fn(&str) -> Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(program) = command {
            return Ok(Self::from_program(program));
        }

        [LOCAL_CLIENT, REMOTE_CLIENT]
            .into_iter()
            .find_map(find)
            .map(Self::from_program)
            .ok_or_else(|| FetchError::MissingParameter {
                name: "command".to_string(),
                message: format!("neither {LOCAL_CLIENT} nor {REMOTE_CLIENT} was found on PATH"),
            })
    }
}
