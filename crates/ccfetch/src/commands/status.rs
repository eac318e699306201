use anyhow::Result;
use ccfetch_term::Output;
use libccfetch::{ClearCase, FetchDescriptor, FetchMethod};

use crate::ui::emit;

/// Run the `ccfetch status` command logic.
pub fn status(fetcher: &ClearCase, descriptor: &FetchDescriptor, output: &dyn Output) -> Result<()> {
    let section = output.section(descriptor.identifier());

    emit(section.item("server", &descriptor.server()))?;
    emit(section.item(
        "client",
        &format!(
            "{} ({})",
            descriptor.client.program.display(),
            descriptor.client.variant
        ),
    ))?;
    emit(section.item("view", descriptor.view_name()))?;
    emit(section.item("view dir", &descriptor.view_dir().display().to_string()))?;
    emit(section.item(
        "config spec",
        &descriptor.config_spec_file().display().to_string(),
    ))?;
    emit(section.item("archive", &descriptor.archive_path().display().to_string()))?;
    emit(section.item(
        "revision",
        &fetcher.sortable_revision(descriptor).revision,
    ))?;

    // needs_update stamps floating identifiers; probe a copy.
    let mut probe = descriptor.clone();
    if fetcher.needs_update(&mut probe) {
        if descriptor.is_floating() {
            emit(section.warn("update needed: floating label is never cached"))?;
        } else {
            emit(section.warn("update needed: no cached archive"))?;
        }
    } else {
        emit(section.success("up to date: cached archive present"))?;
    }

    Ok(())
}
