use anyhow::Result;
use ccfetch_term::Output;
use libccfetch::{FetchConfig, FetchDescriptor, Verb, build_command, network_policy};

use crate::ui::emit;

/// Order in which a download issues its commands.
const LIFECYCLE: [Verb; 3] = [Verb::MkView, Verb::SetCs, Verb::RmView];

/// Run the `ccfetch plan` command logic: show what a download would run,
/// without running it.
pub fn plan(config: &FetchConfig, descriptor: &FetchDescriptor, output: &dyn Output) -> Result<()> {
    let policy = network_policy(config);
    let section = output.section(&format!("plan for {}", descriptor.identifier()));

    for verb in LIFECYCLE {
        let command = build_command(descriptor, verb);
        emit(section.item(verb.as_str(), &command.to_string()))?;
        if let Err(e) = policy.check(&command, &descriptor.host, &descriptor.url()) {
            emit(section.warn(&format!("would be refused: {e}")))?;
        }
    }
    emit(section.item(
        "archive",
        &descriptor.archive_path().display().to_string(),
    ))?;

    Ok(())
}
