use std::{fs, path::Path};

use tracing::{info, warn};

use crate::{descriptor::FetchDescriptor, error::Result};

/// The config spec a view is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSpec {
    /// Rules generated from the descriptor's vob, module and label.
    Generated(String),
    /// Caller-supplied rules; the label only names the archive.
    Custom(String),
}

impl ConfigSpec {
    /// Produce the config spec for `descriptor`.
    pub fn for_descriptor(descriptor: &FetchDescriptor) -> Self {
        match &descriptor.custom_config_spec {
            Some(custom) => Self::Custom(normalize(custom)),
            None => Self::Generated(generate(
                &descriptor.vob,
                &descriptor.module,
                &descriptor.label,
            )),
        }
    }

    /// The rule text.
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) | Self::Custom(text) => text,
        }
    }

    /// Whether the text came from the caller rather than the label.
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Write the config spec to `path`, replacing any previous contents.
    pub fn write(&self, path: &Path) -> Result<()> {
        if self.is_custom() {
            warn!("A custom config spec has been set, the label is only relevant for the archive name");
        }
        info!("Using config spec: \n{}", self.text());
        fs::write(path, self.text())?;
        Ok(())
    }
}

/// The canonical three-rule spec: keep checkouts, pin to the label, load the
/// module.
pub fn generate(vob: &str, module: &str, label: &str) -> String {
    format!("element * CHECKEDOUT\nelement * {label}\nload {vob}{module}\n")
}

/// Normalize line endings of caller-supplied config spec text.
///
/// CRLF and bare CR become LF. Text without any line break is a single-line
/// configuration value, and only there does a literal `\n` escape become a
/// newline; multi-line text keeps backslashes untouched, so Windows paths such
/// as `\vob1\new_dir` survive. The result always ends in a newline.
fn normalize(text: &str) -> String {
    let mut normalized = if text.contains(['\n', '\r']) {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.replace("\\n", "\n")
    };
    if !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use crate::testutil;

    use super::*;

    #[test]
    fn default_spec_is_three_rules() {
        assert_eq!(
            generate("/vob1", "/mod1", "rel1"),
            "element * CHECKEDOUT\nelement * rel1\nload /vob1/mod1\n"
        );
        assert_eq!(
            generate("/vob1", "", "/main/LATEST"),
            "element * CHECKEDOUT\nelement * /main/LATEST\nload /vob1\n"
        );
    }

    #[test]
    fn descriptor_without_override_generates() {
        let tmp = tempdir().unwrap();
        let descriptor = testutil::descriptor(tmp.path(), "rel1");
        let spec = ConfigSpec::for_descriptor(&descriptor);
        assert!(!spec.is_custom());
        assert_eq!(
            spec.text(),
            "element * CHECKEDOUT\nelement * rel1\nload /vob1/mod1\n"
        );
    }

    #[test]
    fn custom_override_is_verbatim() {
        let tmp = tempdir().unwrap();
        let custom = "element * CHECKEDOUT\nelement /vob2/... REL_9\nload /vob2\n";
        for label in ["rel1", "other", "/main/LATEST"] {
            let mut descriptor = testutil::descriptor(tmp.path(), label);
            descriptor.custom_config_spec = Some(custom.to_string());
            let spec = ConfigSpec::for_descriptor(&descriptor);
            assert!(spec.is_custom());
            assert_eq!(spec.text(), custom);
        }
    }

    #[test]
    fn custom_line_endings_are_normalized() {
        assert_eq!(normalize("a\r\nb\r\n"), "a\nb\n");
        assert_eq!(normalize("a\\nb"), "a\nb\n");
        assert_eq!(normalize("a\rb"), "a\nb\n");
        assert_eq!(normalize("a\n"), "a\n");
    }

    #[test]
    fn multi_line_spec_keeps_backslash_paths() {
        let text = "element \\vob1\\new_dir\\... REL_2\nload \\vob1\\new_dir\n";
        assert_eq!(normalize(text), text);

        let crlf = "element \\vob1\\new_dir\\... REL_2\r\nload \\vob1\r\n";
        assert_eq!(
            normalize(crlf),
            "element \\vob1\\new_dir\\... REL_2\nload \\vob1\n"
        );
    }

    #[test]
    fn write_replaces_previous_contents() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("spec");
        fs::write(&path, "stale rules that are much longer than the new ones\n").unwrap();

        let spec = ConfigSpec::Generated(generate("/v", "", "L"));
        spec.write(&path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "element * CHECKEDOUT\nelement * L\nload /v\n"
        );
    }
}
