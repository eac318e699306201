use std::result::Result as StdResult;

use anyhow::Result;
use ccfetch_term::{Output, OutputError};
use libccfetch::{CleanupReport, FetchDescriptor, FetchError};

/// Convert output-layer failures into domain errors.
pub fn map_output_error(err: OutputError) -> FetchError {
    FetchError::Internal(format!("Output operation failed: {err}"))
}

/// Emit an output result, mapping errors into `FetchError`.
pub fn emit(result: StdResult<(), OutputError>) -> Result<()> {
    result.map_err(map_output_error)?;
    Ok(())
}

/// Render the outcome of a cleanup for `descriptor`.
pub fn render_cleanup_report(
    output: &dyn Output,
    descriptor: &FetchDescriptor,
    report: CleanupReport,
) -> Result<()> {
    let section = output.section(&format!("cleaning view: {}", descriptor.view_name()));

    if report.view_removed {
        emit(section.success(&format!("removed view {}", descriptor.view_dir().display())))?;
    }
    if report.config_spec_removed {
        emit(section.success(&format!(
            "removed config spec {}",
            descriptor.config_spec_file().display()
        )))?;
    }
    if !report.view_removed && !report.config_spec_removed {
        emit(section.message("nothing to clean"))?;
    }

    Ok(())
}
