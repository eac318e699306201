//! Shared fixtures and fakes for unit tests.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use flate2::read::GzDecoder;

use crate::{
    archive::{Archiver, TarGzArchiver},
    client::Client,
    command::{CcaseCommand, Verb},
    config::{FetchConfig, FixedClock},
    descriptor::FetchDescriptor,
    error::{FetchError, Result},
    exec::CommandRunner,
    fetcher::ClearCase,
    policy::AllowNetwork,
};

/// Timestamp used by every fixture.
pub const TIMESTAMP: &str = "20240101120000";

/// File the fake `setcs` loads into the view.
pub const LOADED_FILE: &str = "vob1/mod1/main.c";

/// Parameter map with `vob` and an optional `module`.
pub fn params(vob: &str, module: Option<&str>) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("vob".to_string(), vob.to_string());
    if let Some(module) = module {
        params.insert("module".to_string(), module.to_string());
    }
    params
}

/// Configuration rooted at `download_dir` with a fixed timestamp.
pub fn config(download_dir: &Path, label: &str) -> FetchConfig {
    FetchConfig {
        label: label.to_string(),
        download_dir: download_dir.to_path_buf(),
        timestamp: Some(TIMESTAMP.to_string()),
        ..FetchConfig::default()
    }
}

/// Descriptor for `/vob1` + `/mod1` on `cc.example.org` using the local client.
pub fn descriptor(download_dir: &Path, label: &str) -> FetchDescriptor {
    descriptor_at(download_dir, label, TIMESTAMP)
}

/// Like [`descriptor`], with the view created at `timestamp`.
pub fn descriptor_at(download_dir: &Path, label: &str, timestamp: &str) -> FetchDescriptor {
    FetchDescriptor::new(
        "cc.example.org",
        "/ccrc",
        &params("/vob1", Some("/mod1")),
        &config(download_dir, label),
        Client::from_program("cleartool"),
        &FixedClock(timestamp.to_string()),
    )
    .unwrap()
}

/// Fetcher wired to `runner`, open network and a real archiver.
pub fn fetcher(runner: FakeRunner) -> ClearCase {
    ClearCase::new(&FetchConfig::default())
        .with_runner(runner)
        .with_policy(AllowNetwork)
        .with_archiver(TarGzArchiver)
        .with_clock(FixedClock(TIMESTAMP.to_string()))
}

/// One command seen by [`FakeRunner`].
#[derive(Debug, Clone)]
pub struct Call {
    /// Which verb ran.
    pub verb: Verb,
    /// Arguments as strings.
    pub args: Vec<String>,
    /// Working directory it ran in.
    pub workdir: Option<PathBuf>,
}

/// Runner that mimics the client on the filesystem and records every call.
///
/// `mkview` creates the view directory, `setcs` loads [`LOADED_FILE`] and
/// `rmview` deletes the view. A scripted failure still creates the view
/// directory for `mkview`, like a server that dies half way.
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    /// Calls in execution order.
    calls: Arc<Mutex<Vec<Call>>>,
    /// Shared verb log, for observing several runners at once.
    order: Option<Arc<Mutex<Vec<Verb>>>>,
    /// Verb that fails, with the message it fails with.
    fail: Option<(Verb, String)>,
}

impl FakeRunner {
    /// A runner whose `verb` fails with `message`.
    pub fn failing(verb: Verb, message: &str) -> Self {
        Self {
            fail: Some((verb, message.to_string())),
            ..Self::default()
        }
    }

    /// A runner that also appends each verb to `order`.
    pub fn recording_into(order: Arc<Mutex<Vec<Verb>>>) -> Self {
        Self {
            order: Some(order),
            ..Self::default()
        }
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Verbs of every call so far.
    pub fn verbs(&self) -> Vec<Verb> {
        self.calls().into_iter().map(|call| call.verb).collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, command: &CcaseCommand, workdir: Option<&Path>) -> Result<String> {
        let args = command.arg_strings();
        self.calls.lock().unwrap().push(Call {
            verb: command.verb,
            args: args.clone(),
            workdir: workdir.map(Path::to_path_buf),
        });
        if let Some(order) = &self.order {
            order.lock().unwrap().push(command.verb);
        }
        let target = args.last().map(PathBuf::from);

        let failure = self
            .fail
            .as_ref()
            .filter(|(verb, _)| *verb == command.verb)
            .map(|(_, message)| FetchError::Command {
                command: command.to_string(),
                message: message.clone(),
            });

        match command.verb {
            Verb::MkView => {
                if let Some(view) = target {
                    fs::create_dir_all(view)?;
                }
            }
            Verb::SetCs if failure.is_none() => {
                let view = workdir.expect("setcs runs inside the view");
                let loaded = view.join(LOADED_FILE);
                fs::create_dir_all(loaded.parent().unwrap())?;
                fs::write(loaded, "int main(void) { return 0; }\n")?;
            }
            Verb::SetCs => {}
            Verb::RmView => {
                if failure.is_none()
                    && let Some(view) = target
                {
                    fs::remove_dir_all(view)?;
                }
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(format!("{} done", command.verb)),
        }
    }
}

/// Archiver that leaves a truncated file behind and fails.
#[derive(Debug, Clone, Copy)]
pub struct FailingArchiver;

impl Archiver for FailingArchiver {
    fn pack(&self, _source: &Path, dest: &Path) -> Result<()> {
        fs::write(dest, b"\x1f\x8b")?;
        Err(FetchError::Archive {
            path: dest.to_path_buf(),
            message: "disk full".to_string(),
        })
    }
}

/// Entry paths of a `.tar.gz`, without the `./` prefix.
pub fn archive_entries(path: &Path) -> BTreeSet<String> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            let name = entry.path().unwrap().display().to_string();
            name.trim_start_matches("./").trim_end_matches('/').to_string()
        })
        .filter(|name| !name.is_empty() && name != ".")
        .collect()
}

/// Contents of `name` inside a `.tar.gz`, if present.
pub fn archive_file(path: &Path, name: &str) -> Option<String> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let entry_name = entry.path().unwrap().display().to_string();
        if entry_name.trim_start_matches("./") == name {
            let mut text = String::new();
            entry.read_to_string(&mut text).unwrap();
            return Some(text);
        }
    }
    None
}
