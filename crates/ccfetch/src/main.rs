#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Command-line interface for fetching ClearCase content via the libccfetch crate.

use std::{
    env,
    io::{self, IsTerminal, Write},
    process,
    sync::Arc,
};

use anyhow::Result;
use ccfetch_term::{Output, Quiet, Terminal};
use clap::Parser;
use libccfetch::{ClearCase, FetchError, FetchMethod};

/// Command-line argument definitions.
mod args;
/// Subcommand implementations.
mod commands;
/// Layering of flags, environment and config file into a fetch configuration.
mod settings;
/// Rendering helpers shared by the subcommands.
mod ui;
/// Small path and logging helpers.
mod utils;

use args::{Cli, Commands};

/// CLI entrypoint.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine color output preference early for error handling
    let color = if cli.color {
        true
    } else if cli.no_color {
        false
    } else {
        // Auto-detect based on terminal
        io::stdout().is_terminal()
    };

    utils::init_logging(cli.verbose);

    // Create output handler for potential error messages
    let output: Arc<dyn Output> = if cli.quiet {
        Arc::new(Quiet)
    } else {
        Arc::new(Terminal::new(color))
    };

    // Handle errors with custom formatting
    if let Err(e) = run(&cli, &output) {
        // Reset any existing colors only if color was enabled and stdout is a TTY
        if color && io::stdout().is_terminal() {
            print!("\x1b[0m");
            if let Err(flush_err) = io::stdout().flush() {
                eprintln!("Failed to flush stdout while resetting colors: {flush_err}");
            }
        }

        if let Err(display_err) = output.fail(&format!("{e:#}")) {
            eprintln!("Failed to report error via output handler: {display_err:#}");
        }
        if let Err(finish_err) = output.finish() {
            eprintln!("Failed to flush output handler: {finish_err:#}");
        }

        let exit_code = e
            .downcast_ref::<FetchError>()
            .map_or(1, FetchError::exit_code);
        process::exit(exit_code);
    }
    Ok(())
}

/// Execute the selected CLI command using the provided output implementation.
fn run(cli: &Cli, output: &Arc<dyn Output>) -> Result<()> {
    let target = cli.command_kind.target();
    let config = settings::resolve(cli, target, |key| env::var(key).ok())?;
    let params = settings::params(target);

    let fetcher = ClearCase::new(&config);
    let mut descriptor = fetcher.init_descriptor(&target.host, &target.path, &params, &config)?;

    match &cli.command_kind {
        Commands::Fetch { force, .. } => {
            commands::fetch::fetch(&fetcher, &mut descriptor, output.as_ref(), *force)?;
        }
        Commands::Status { .. } => {
            commands::status::status(&fetcher, &descriptor, output.as_ref())?;
        }
        Commands::Spec { .. } => {
            commands::spec::spec(&descriptor, output.as_ref())?;
        }
        Commands::Plan { .. } => {
            commands::plan::plan(&config, &descriptor, output.as_ref())?;
        }
        Commands::Clean { .. } => {
            commands::clean::clean(&fetcher, &descriptor, output.as_ref())?;
        }
    }

    output.finish()?;
    Ok(())
}
