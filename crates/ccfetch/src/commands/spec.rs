use std::io::{self, Write};

use anyhow::Result;
use ccfetch_term::Output;
use libccfetch::{ConfigSpec, FetchDescriptor};

use crate::ui::emit;

/// Run the `ccfetch spec` command logic.
///
/// The spec text goes to stdout unadorned so it can be redirected to a file.
pub fn spec(descriptor: &FetchDescriptor, output: &dyn Output) -> Result<()> {
    let spec = ConfigSpec::for_descriptor(descriptor);
    if spec.is_custom() {
        emit(output.warn(
            "A custom config spec has been set, the label is only relevant for the archive name",
        ))?;
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(spec.text().as_bytes())?;
    stdout.flush()?;
    Ok(())
}
