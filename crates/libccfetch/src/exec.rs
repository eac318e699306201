use std::{
    path::Path,
    process::{Command, Output},
};

use anyhow::Context;

use crate::{
    command::CcaseCommand,
    error::{FetchError, Result},
};

/// Executes built client commands.
///
/// Implementations must block until the command finishes and report any
/// failure as [`FetchError::Command`]; timeouts are theirs to enforce.
pub trait CommandRunner: Send + Sync {
    /// Run `command`, optionally inside `workdir`, returning its standard output.
    fn run(&self, command: &CcaseCommand, workdir: Option<&Path>) -> Result<String>;
}

/// Runs commands as child processes, without a shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &CcaseCommand, workdir: Option<&Path>) -> Result<String> {
        let output = spawn(command, workdir).map_err(|e| FetchError::Command {
            command: command.to_string(),
            message: format!("{e:#}"),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let mut message = format!("{}\nError: {}", output.status, stderr.trim());
            if !stdout.trim().is_empty() {
                message.push_str(&format!("\nOutput: {}", stdout.trim()));
            }
            return Err(FetchError::Command {
                command: command.to_string(),
                message,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Spawn the client process and wait for it to exit.
fn spawn(command: &CcaseCommand, workdir: Option<&Path>) -> anyhow::Result<Output> {
    let mut process = Command::new(&command.program);
    process.args(&command.args);
    if let Some(dir) = workdir {
        process.current_dir(dir);
    }
    process
        .output()
        .with_context(|| format!("Failed to execute command: {command}"))
}
