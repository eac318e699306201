#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Terminal output primitives for ccfetch frontends.
//!
//! This crate isolates terminal rendering and spinners so libccfetch can
//! remain UI-agnostic. Use these helpers in CLI frontends.

/// Terminal output abstractions and implementations.
mod output;

pub use output::{Output, OutputError, Quiet, Spinner, Terminal};
