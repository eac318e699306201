#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Timestamp passed to every invocation so view names are predictable.
pub const TIMESTAMP: &str = "20240101120000";

/// Return the path to the compiled `ccfetch` binary for integration-style tests.
pub fn ccfetch_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ccfetch"))
}

/// Write a fake clearcase client named `name` into `dir`.
///
/// The script appends each invocation's arguments to `calls.log` next to
/// itself, and mimics the client on disk: `mkview` creates the view
/// directory, `setcs` loads a source file into the current directory and
/// `rmview` deletes the view. When `fail` names the subcommand, the script
/// prints the paired message to stderr and exits 1 instead.
pub fn fake_client(dir: &Path, name: &str, fail: Option<(&str, &str)>) -> Result<PathBuf> {
    let log = dir.join("calls.log");
    let (fail_verb, fail_message) = fail.unwrap_or(("", ""));
    let script = format!(
        r#"#!/bin/sh
echo "$@" >> "{log}"
verb="$1"
for last; do :; done
if [ "$verb" = "{fail_verb}" ]; then
    echo "{fail_message}" >&2
    exit 1
fi
case "$verb" in
    mkview) mkdir -p "$last" ;;
    setcs) mkdir -p vob1/mod1 && echo 'int main(void);' > vob1/mod1/main.c ;;
    rmview) rm -rf "$last" ;;
esac
echo "$verb ok"
"#,
        log = log.display(),
    );
    let path = dir.join(name);
    fs::write(&path, script)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Lines logged by the fake client so far, empty when it never ran.
pub fn calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("calls.log"))
        .map(|text| text.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Prepare a `Command` running `ccfetch` against `download_dir` with `client`.
pub fn ccfetch_command(download_dir: &Path, client: &Path) -> Command {
    let mut cmd = Command::new(ccfetch_binary());
    cmd.env_remove("CCFETCH_CONFIG");
    cmd.env_remove("CCFETCH_DOWNLOAD_DIR");
    cmd.env_remove("CCFETCH_LOG");
    cmd.arg("--dir").arg(download_dir);
    cmd.arg("--command").arg(client);
    cmd.arg("--timestamp").arg(TIMESTAMP);
    cmd.arg("--no-color");
    cmd
}

/// Run `ccfetch` with the provided arguments, returning the command output.
pub fn run_ccfetch(download_dir: &Path, client: &Path, args: &[&str]) -> Result<Output> {
    let mut cmd = ccfetch_command(download_dir, client);
    cmd.args(args);
    cmd.output()
        .with_context(|| format!("failed to run ccfetch {}", args.join(" ")))
}

/// Standard target arguments for `subcommand`: `/vob1` + `/mod1` at `label`.
pub fn target_args<'a>(subcommand: &'a str, label: &'a str) -> Vec<&'a str> {
    vec![
        subcommand,
        "--host",
        "cc.example.org",
        "--vob",
        "/vob1",
        "--module",
        "/mod1",
        "--label",
        label,
    ]
}

/// Stdout and stderr of `output`, concatenated.
pub fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
