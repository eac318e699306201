use anyhow::Result;
use ccfetch_term::Output;
use libccfetch::{ClearCase, FetchDescriptor, FetchMethod};

use crate::ui::emit;

/// Run the `ccfetch fetch` command logic.
///
/// Floating labels always download. Pinned labels reuse a cached archive
/// unless `force` is set.
pub fn fetch(
    fetcher: &ClearCase,
    descriptor: &mut FetchDescriptor,
    output: &dyn Output,
    force: bool,
) -> Result<()> {
    if !fetcher.needs_update(descriptor) && !force {
        emit(output.success(&format!(
            "Using cached archive {}",
            descriptor.archive_path().display()
        )))?;
        return Ok(());
    }

    let spinner = output.spinner(&format!(
        "Fetching {}{} at {}...",
        descriptor.vob, descriptor.module, descriptor.label
    ));
    match fetcher.download(descriptor) {
        Ok(archive) => {
            spinner.finish_success(&format!("Archive written to {}", archive.display()));
            Ok(())
        }
        Err(err) => {
            spinner.finish_fail(&format!("Failed to fetch {}", descriptor.identifier()));
            Err(err.into())
        }
    }
}
