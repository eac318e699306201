use std::{
    ffi::OsString,
    fmt,
    path::PathBuf,
    str::FromStr,
};

use tracing::debug;

use crate::{
    client::ClientVariant,
    descriptor::FetchDescriptor,
    error::{FetchError, Result},
};

/// Client subcommands the fetcher issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Create the view.
    MkView,
    /// Remove the view.
    RmView,
    /// Apply the config spec, loading content into the view.
    SetCs,
}

impl Verb {
    /// The subcommand name as the client expects it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MkView => "mkview",
            Self::RmView => "rmview",
            Self::SetCs => "setcs",
        }
    }
}

impl FromStr for Verb {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mkview" => Ok(Self::MkView),
            "rmview" => Ok(Self::RmView),
            "setcs" => Ok(Self::SetCs),
            other => Err(FetchError::Internal(format!(
                "Invalid ccase command {other}"
            ))),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built client invocation: program plus discrete arguments.
///
/// Arguments are never joined into a shell string, so vob or module values
/// cannot smuggle in extra commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcaseCommand {
    /// Subcommand this invocation performs.
    pub verb: Verb,
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments, starting with the subcommand name.
    pub args: Vec<OsString>,
}

impl CcaseCommand {
    /// Arguments as lossy strings, handy for assertions and display.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for CcaseCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Build the invocation of `verb` for `descriptor`.
///
/// Remote clients get `-server <address>` directly after the subcommand on
/// every verb. Local clients get `-snapshot` on `mkview`, which remote
/// clients must never receive.
pub fn build(descriptor: &FetchDescriptor, verb: Verb) -> CcaseCommand {
    let variant = descriptor.client.variant;
    let mut args: Vec<OsString> = vec![verb.as_str().into()];

    if variant == ClientVariant::Remote {
        args.push("-server".into());
        args.push(descriptor.server().into());
    }

    match verb {
        Verb::MkView => {
            if variant == ClientVariant::Local {
                args.push("-snapshot".into());
            }
            args.push("-tag".into());
            args.push(descriptor.view_name().into());
            args.push(descriptor.view_dir().into_os_string());
        }
        Verb::RmView => {
            args.push("-force".into());
            args.push(descriptor.view_dir().into_os_string());
        }
        Verb::SetCs => {
            args.push("-overwrite".into());
            args.push(descriptor.config_spec_file().into_os_string());
        }
    }

    let command = CcaseCommand {
        verb,
        program: descriptor.client.program.clone(),
        args,
    };
    debug!(ccasecmd = %command, "built command");
    command
}

/// Build a command from a subcommand name.
///
/// Unknown names are a programming error and yield [`FetchError::Internal`].
pub fn build_named(descriptor: &FetchDescriptor, verb: &str) -> Result<CcaseCommand> {
    Ok(build(descriptor, verb.parse()?))
}
