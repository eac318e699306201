use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("color_mode")
        .args(["color", "no_color"])
))]
/// Top-level CLI options for ccfetch.
pub struct Cli {
    /// Override the download directory
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<String>,

    /// Read settings from a TOML config file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<String>,

    /// Use this cleartool or rcleartool binary instead of searching PATH
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub command: Option<PathBuf>,

    /// Fixed timestamp used in view names and floating identifiers
    #[arg(long, global = true, value_name = "STAMP")]
    pub timestamp: Option<String>,

    /// Refuse to contact the clearcase server
    #[arg(long = "no-network", global = true)]
    pub no_network: bool,

    /// Enable colored output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Suppress all output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    /// The primary command to execute.
    pub command_kind: Commands,
}

/// What to fetch: server location, vob, module and revision selection.
#[derive(Args, Clone, Debug)]
pub struct Target {
    /// CCRC server host
    #[arg(long, value_name = "HOST")]
    pub host: String,

    /// Server path of the CCRC service
    #[arg(long, value_name = "PATH", default_value = "/ccrc")]
    pub path: String,

    /// VOB to load, with a leading '/'
    #[arg(long, value_name = "VOB")]
    pub vob: Option<String>,

    /// Module inside the VOB
    #[arg(long, value_name = "MODULE")]
    pub module: Option<String>,

    /// Server protocol (http or https)
    #[arg(long, value_name = "PROTO")]
    pub protocol: Option<String>,

    /// Label selecting the revision, e.g. REL_1.0 or /main/LATEST
    #[arg(long, value_name = "LABEL")]
    pub label: Option<String>,

    /// Use the config spec in FILE instead of generating one
    #[arg(long = "config-spec", value_name = "FILE")]
    pub config_spec: Option<PathBuf>,
}

#[derive(Subcommand)]
/// CLI subcommands supported by ccfetch.
pub enum Commands {
    /// Fetch the target into an archive, reusing a cached one when possible
    Fetch {
        /// Download even if a cached archive exists
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        /// What to fetch.
        target: Target,
    },

    /// Show identifier, paths and cache state for a target
    Status {
        #[command(flatten)]
        /// What to inspect.
        target: Target,
    },

    /// Print the config spec a fetch would use
    Spec {
        #[command(flatten)]
        /// What to generate the spec for.
        target: Target,
    },

    /// Print the client commands a fetch would run
    Plan {
        #[command(flatten)]
        /// What to plan.
        target: Target,
    },

    /// Remove a leftover view and config spec file
    Clean {
        #[command(flatten)]
        /// What to clean up after.
        target: Target,
    },
}

impl Commands {
    /// The target every subcommand operates on.
    pub fn target(&self) -> &Target {
        match self {
            Self::Fetch { target, .. }
            | Self::Status { target }
            | Self::Spec { target }
            | Self::Plan { target }
            | Self::Clean { target } => target,
        }
    }
}
