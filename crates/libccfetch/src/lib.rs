#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Core library for fetching ClearCase VOB content into cacheable archives.
//!
//! A fetch is described by a [`FetchDescriptor`]: server location, the vob
//! and module to load and the label selecting their revision. [`ClearCase`]
//! turns a descriptor into a `.tar.gz` in the download directory by creating
//! a snapshot view, applying a generated config spec, packing the view and
//! removing it again. The CLI binary in `crates/ccfetch` builds on top of this
//! library.

/// Packing a loaded view into an archive.
mod archive;
/// Local and remote client detection.
mod client;
/// Client command construction.
mod command;
/// Fetch configuration and timestamp sources.
mod config;
/// Config spec generation and custom spec handling.
mod configspec;
/// Fetch descriptors and the identifiers and paths derived from them.
mod descriptor;
/// Error type shared by every operation.
mod error;
/// Running client commands as processes.
mod exec;
/// View lifecycle and cache policy.
mod fetcher;
/// Per-identifier cache locking.
mod lock;
/// Network access gating.
mod policy;
#[cfg(test)]
mod testutil;

/// Re-exports for archive writers.
pub use archive::{Archiver, TarGzArchiver};
/// Re-exports for client selection.
pub use client::{Client, ClientVariant, LOCAL_CLIENT, REMOTE_CLIENT};
/// Re-exports for command construction.
pub use command::{CcaseCommand, Verb, build as build_command, build_named as build_named_command};
/// Re-exports for configuration.
pub use config::{Clock, FetchConfig, FixedClock, INVALID_LABEL, SystemClock};
/// Re-exports for config spec text.
pub use configspec::{ConfigSpec, generate as generate_config_spec};
/// Re-exports for descriptors and identifier derivation.
pub use descriptor::{FLOATING_LABEL, FetchDescriptor, Protocol, SCHEME, identifier, view_name};
/// Re-exports for errors.
pub use error::{FetchError, LOGIN_HINT, Result};
/// Re-exports for command execution.
pub use exec::{CommandRunner, ProcessRunner};
/// Re-exports for the fetcher and its lifecycle.
pub use fetcher::{ClearCase, CleanupReport, FetchMethod, SortableRevision, View, ViewState};
/// Re-export of the cache lock.
pub use lock::CacheLock;
/// Re-exports for network policies.
pub use policy::{AllowNetwork, HostAllowList, NetworkPolicy, NoNetwork, from_config as network_policy};
