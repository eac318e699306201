use anyhow::Result;
use ccfetch_term::Output;
use libccfetch::{ClearCase, FetchDescriptor, FetchMethod};

use crate::ui::render_cleanup_report;

/// Run the `ccfetch clean` command logic.
///
/// The view is the one named by the invocation's timestamp, so pass the
/// `--timestamp` of the fetch that left it behind.
pub fn clean(fetcher: &ClearCase, descriptor: &FetchDescriptor, output: &dyn Output) -> Result<()> {
    let report = fetcher.clean(descriptor)?;
    render_cleanup_report(output, descriptor, report)
}
