use std::{io, path::Path};

use flate2::{Compression, write::GzEncoder};
use tempfile::NamedTempFile;

use crate::error::{FetchError, Result};

/// Packs a directory into a single compressed archive.
pub trait Archiver: Send + Sync {
    /// Write the contents of `source` to `dest`, paths relative to `source`.
    ///
    /// `dest` must only ever be observed complete: other processes treat its
    /// existence as a finished cache entry.
    fn pack(&self, source: &Path, dest: &Path) -> Result<()>;
}

/// Gzip-compressed tarball writer.
///
/// The tarball is streamed into a temporary file next to `dest` and renamed
/// into place once the gzip trailer is written.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarGzArchiver;

impl Archiver for TarGzArchiver {
    fn pack(&self, source: &Path, dest: &Path) -> Result<()> {
        let archive_error = |e: io::Error| FetchError::Archive {
            path: dest.to_path_buf(),
            message: e.to_string(),
        };

        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staging = NamedTempFile::new_in(dir).map_err(archive_error)?;
        let mut builder = tar::Builder::new(GzEncoder::new(staging, Compression::default()));
        builder.follow_symlinks(false);
        builder.append_dir_all(".", source).map_err(archive_error)?;
        let encoder = builder.into_inner().map_err(archive_error)?;
        let staging = encoder.finish().map_err(archive_error)?;
        staging.persist(dest).map_err(|e| archive_error(e.error))?;
        Ok(())
    }
}
