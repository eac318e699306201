use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{
    archive::{Archiver, TarGzArchiver},
    client::Client,
    command::{self, CcaseCommand, Verb},
    config::{Clock, FetchConfig},
    configspec::ConfigSpec,
    descriptor::{FetchDescriptor, SCHEME},
    error::{FetchError, Result},
    exec::{CommandRunner, ProcessRunner},
    lock::CacheLock,
    policy::{self, NetworkPolicy},
};

/// Lifecycle position of a view owned by one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// No view has been created yet.
    Absent,
    /// `mkview` succeeded; nothing is loaded.
    ViewCreated,
    /// `setcs` loaded the selected content.
    ConfigApplied,
    /// The view was packed into the archive.
    Archived,
    /// The view and config spec file were removed.
    Cleaned,
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Absent => "absent",
            Self::ViewCreated => "view created",
            Self::ConfigApplied => "config applied",
            Self::Archived => "archived",
            Self::Cleaned => "cleaned",
        };
        f.write_str(name)
    }
}

/// Report describing what happened during a cleanup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Whether `rmview` removed a view directory.
    pub view_removed: bool,
    /// Whether the config spec file was deleted.
    pub config_spec_removed: bool,
}

/// Revision identity reported to the fetch layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortableRevision {
    /// Whether revisions of this backend can be ordered.
    pub sortable: bool,
    /// Opaque revision string, for display and grouping.
    pub revision: String,
}

/// Operations a fetch dispatcher needs from a backend.
pub trait FetchMethod {
    /// Whether this backend handles URLs with `scheme`.
    fn supports(&self, scheme: &str) -> bool;

    /// Build the descriptor for a fetch location and its parameters.
    fn init_descriptor(
        &self,
        host: &str,
        path: &str,
        params: &BTreeMap<String, String>,
        config: &FetchConfig,
    ) -> Result<FetchDescriptor>;

    /// Decide whether the archive must be (re)fetched.
    fn needs_update(&self, descriptor: &mut FetchDescriptor) -> bool;

    /// Produce the archive, returning its path.
    fn download(&self, descriptor: &FetchDescriptor) -> Result<PathBuf>;

    /// Remove whatever a download left behind.
    fn clean(&self, descriptor: &FetchDescriptor) -> Result<CleanupReport>;

    /// Whether a revision can be pinned by label.
    fn supports_revision_pinning(&self) -> bool;

    /// Revision identity of `descriptor`.
    fn sortable_revision(&self, descriptor: &FetchDescriptor) -> SortableRevision;
}

/// ClearCase fetcher: drives the client through view creation, config spec
/// application, archiving and cleanup.
///
/// Collaborators for process execution, network policy, archiving and time are
/// injected, so every step can be exercised without a clearcase installation.
pub struct ClearCase {
    /// Executes client commands.
    runner: Box<dyn CommandRunner>,
    /// Gate consulted before each command.
    policy: Box<dyn NetworkPolicy>,
    /// Packs the view into the archive.
    archiver: Box<dyn Archiver>,
    /// Timestamp source for view names and floating identifiers.
    clock: Box<dyn Clock>,
    /// Whether downloads hold the per-identifier cache lock.
    lock_cache: bool,
}

impl ClearCase {
    /// Create a fetcher with the production collaborators implied by `config`.
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            runner: Box::new(ProcessRunner),
            policy: policy::from_config(config),
            archiver: Box::new(TarGzArchiver),
            clock: config.clock(),
            lock_cache: config.lock_cache,
        }
    }

    /// Replace the command runner.
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Replace the network policy.
    pub fn with_policy(mut self, policy: impl NetworkPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Replace the archiver.
    pub fn with_archiver(mut self, archiver: impl Archiver + 'static) -> Self {
        self.archiver = Box::new(archiver);
        self
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Start a lifecycle for `descriptor` in the [`ViewState::Absent`] state.
    pub fn view<'a>(&'a self, descriptor: &'a FetchDescriptor) -> View<'a> {
        View {
            fetcher: self,
            descriptor,
            state: ViewState::Absent,
        }
    }

    /// Check the policy, then run `command`.
    fn execute(
        &self,
        descriptor: &FetchDescriptor,
        command: &CcaseCommand,
        workdir: Option<&Path>,
    ) -> Result<String> {
        self.policy
            .check(command, &descriptor.host, &descriptor.url())?;
        self.runner.run(command, workdir)
    }
}

impl FetchMethod for ClearCase {
    fn supports(&self, scheme: &str) -> bool {
        scheme == SCHEME
    }

    fn init_descriptor(
        &self,
        host: &str,
        path: &str,
        params: &BTreeMap<String, String>,
        config: &FetchConfig,
    ) -> Result<FetchDescriptor> {
        let client = Client::detect(config.command.as_deref())?;
        FetchDescriptor::new(host, path, params, config, client, self.clock.as_ref())
    }

    fn needs_update(&self, descriptor: &mut FetchDescriptor) -> bool {
        if descriptor.is_floating() {
            descriptor.append_timestamp(&self.clock.timestamp());
            return true;
        }
        !descriptor.archive_path().exists()
    }

    fn download(&self, descriptor: &FetchDescriptor) -> Result<PathBuf> {
        fs::create_dir_all(descriptor.download_dir())?;
        let _lock = if self.lock_cache {
            Some(CacheLock::acquire(&descriptor.lock_path())?)
        } else {
            None
        };

        let mut view = self.view(descriptor);
        let result = run_lifecycle(&mut view);
        let cleanup = view.clean();

        match (result, cleanup) {
            (Ok(archive), Ok(_)) => Ok(archive),
            (Ok(_), Err(error)) => Err(error),
            (Err(error), Ok(_)) => Err(error),
            (Err(error), Err(cleanup_error)) => {
                warn!(
                    view = %descriptor.view_name(),
                    error = %cleanup_error,
                    "cleanup after failed download also failed"
                );
                Err(error)
            }
        }
    }

    fn clean(&self, descriptor: &FetchDescriptor) -> Result<CleanupReport> {
        self.view(descriptor).clean()
    }

    fn supports_revision_pinning(&self) -> bool {
        true
    }

    fn sortable_revision(&self, descriptor: &FetchDescriptor) -> SortableRevision {
        SortableRevision {
            sortable: false,
            revision: descriptor.identifier().to_string(),
        }
    }
}

/// Walk a fresh view from creation to a finished archive.
fn run_lifecycle(view: &mut View<'_>) -> Result<PathBuf> {
    view.create()?;
    view.apply_config()?;
    view.archive()
}

/// One invocation's view, stepped through its lifecycle.
///
/// Each step checks the current state and refuses to run out of order; that is
/// a programming error reported as [`FetchError::Internal`]. [`View::clean`]
/// is valid from every state.
pub struct View<'a> {
    /// Fetcher providing the collaborators.
    fetcher: &'a ClearCase,
    /// Descriptor the view belongs to.
    descriptor: &'a FetchDescriptor,
    /// Current lifecycle position.
    state: ViewState,
}

impl View<'_> {
    /// Current lifecycle position.
    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Fail unless the view is in `expected`.
    fn require(&self, expected: ViewState, step: &str) -> Result<()> {
        if self.state != expected {
            return Err(FetchError::Internal(format!(
                "cannot {step} a view that is {} (expected {expected})",
                self.state
            )));
        }
        Ok(())
    }

    /// `Absent → ViewCreated`: write the config spec and run `mkview`.
    ///
    /// `mkview` fetches nothing by itself. On failure the state stays
    /// `Absent`; a partially created view directory is left for
    /// [`View::clean`].
    pub fn create(&mut self) -> Result<()> {
        self.require(ViewState::Absent, "create")?;
        let d = self.descriptor;

        let work_dir = d.work_dir();
        fs::create_dir_all(&work_dir)?;
        ConfigSpec::for_descriptor(d).write(&d.config_spec_file())?;

        let command = command::build(d, Verb::MkView);
        info!(vob = %d.vob, label = %d.label, view = %d.view_name(), "creating view");
        self.fetcher
            .execute(d, &command, Some(&work_dir))
            .map_err(FetchError::with_login_hint)?;

        self.state = ViewState::ViewCreated;
        Ok(())
    }

    /// `ViewCreated → ConfigApplied`: run `setcs` inside the view, then copy
    /// the config spec into it so the archive records what was selected.
    pub fn apply_config(&mut self) -> Result<()> {
        self.require(ViewState::ViewCreated, "apply a config spec to")?;
        let d = self.descriptor;

        let view_dir = d.view_dir();
        let command = command::build(d, Verb::SetCs);
        info!(vob = %d.vob, label = %d.label, view = %d.view_name(), "fetching data");
        let output = self.fetcher.execute(d, &command, Some(&view_dir))?;
        info!("{output}");

        fs::copy(d.config_spec_file(), view_dir.join(d.config_spec_name()))?;

        self.state = ViewState::ConfigApplied;
        Ok(())
    }

    /// `ConfigApplied → Archived`: pack the view into the archive.
    ///
    /// A partially written archive is deleted before the error propagates.
    pub fn archive(&mut self) -> Result<PathBuf> {
        self.require(ViewState::ConfigApplied, "archive")?;
        let d = self.descriptor;

        let dest = d.archive_path();
        if let Err(error) = self.fetcher.archiver.pack(&d.view_dir(), &dest) {
            if let Err(remove_error) = remove_if_present(&dest) {
                warn!(
                    archive = %dest.display(),
                    error = %remove_error,
                    "failed to delete partial archive"
                );
            }
            return Err(error);
        }

        self.state = ViewState::Archived;
        Ok(dest)
    }

    /// Remove the view (via `rmview`, only if its directory exists) and the
    /// config spec file. Missing pieces count as already cleaned, so this can
    /// be called any number of times.
    pub fn clean(&mut self) -> Result<CleanupReport> {
        let d = self.descriptor;
        let mut report = CleanupReport::default();

        let view_dir = d.view_dir();
        let removal = if view_dir.exists() {
            let command = command::build(d, Verb::RmView);
            info!(vob = %d.vob, label = %d.label, view = %d.view_name(), "cleaning up");
            self.fetcher
                .execute(d, &command, Some(&d.work_dir()))
                .map(|output| {
                    info!("rmview output: {output}");
                    report.view_removed = true;
                })
        } else {
            Ok(())
        };

        report.config_spec_removed = remove_if_present(&d.config_spec_file())?;
        removal?;

        self.state = ViewState::Cleaned;
        Ok(report)
    }
}

/// Delete `path`, reporting whether there was anything to delete.
fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
