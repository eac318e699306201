use std::{
    io::{self, Write},
    result::Result as StdResult,
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use thiserror::Error;

/// Indentation level (in spaces) used for nested output sections.
const INDENT: usize = 4;

/// Interval between spinner frames.
const TICK: Duration = Duration::from_millis(100);

/// Errors produced by [`Output`] implementations when writing to the terminal.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Underlying I/O error while writing to the terminal.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias for output-related fallible operations.
pub type Result<T> = StdResult<T, OutputError>;

/// Abstraction over how user-facing messages are produced.
pub trait Output: Send + Sync {
    /// Print an informational message.
    fn message(&self, msg: &str) -> Result<()>;
    /// Print a success message.
    fn success(&self, msg: &str) -> Result<()>;
    /// Print a warning message.
    fn warn(&self, msg: &str) -> Result<()>;
    /// Print an error/failure message.
    fn fail(&self, msg: &str) -> Result<()>;
    /// Print a `key: value` line, key highlighted.
    fn item(&self, key: &str, value: &str) -> Result<()>;
    /// Flush any buffered output.
    fn finish(&self) -> Result<()>;
    /// Create a nested output section that indents subsequent messages.
    fn section(&self, header: &str) -> Box<dyn Output>;
    /// Start a spinner showing `msg` until it is finished.
    fn spinner(&self, msg: &str) -> Spinner;
}

/// Output implementation that suppresses all messages. Useful for scripted
/// or test environments.
pub struct Quiet;

impl Output for Quiet {
    fn message(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn success(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn warn(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn fail(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn item(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        Ok(())
    }

    fn section(&self, _header: &str) -> Box<dyn Output> {
        Box::new(Self)
    }

    fn spinner(&self, _msg: &str) -> Spinner {
        Spinner::hidden()
    }
}

/// Color-capable terminal renderer for user messages.
pub struct Terminal {
    /// Whether to emit ANSI color sequences when writing to stdout.
    color_choice: ColorChoice,
    /// Current indentation depth in spaces.
    indent: usize,
}

impl Terminal {
    /// Create a new terminal output.
    ///
    /// - `color`: when `true`, always render colored output; when `false`,
    ///   disable ANSI colors.
    pub fn new(color: bool) -> Self {
        let color_choice = if color {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        };
        Self {
            color_choice,
            indent: 0,
        }
    }

    /// Write `msg` using `color` while honoring the current indentation level.
    fn write_colored(&self, msg: &str, color: Color) -> Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice);
        stdout.set_color(ColorSpec::new().set_fg(Some(color)))?;
        writeln!(stdout, "{}{msg}", " ".repeat(self.indent))?;
        stdout.reset()?;
        stdout.flush()?;
        Ok(())
    }

    /// Prefix applied to spinner lines at the current indentation.
    fn prefix(&self) -> String {
        " ".repeat(self.indent)
    }
}

impl Output for Terminal {
    fn message(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Cyan)
    }

    fn success(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Green)
    }

    fn warn(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Rgb(255, 165, 0)) // Orange
    }

    fn fail(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Red)
    }

    fn item(&self, key: &str, value: &str) -> Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice);
        write!(stdout, "{}", " ".repeat(self.indent))?;
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        write!(stdout, "{key}:")?;
        stdout.reset()?;
        writeln!(stdout, " {value}")?;
        stdout.flush()?;
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn section(&self, header: &str) -> Box<dyn Output> {
        // A header that fails to print should not stop the section's content.
        if self.message(header).is_err() {
            eprintln!("{header}");
        }

        Box::new(Self {
            color_choice: self.color_choice,
            indent: self.indent + INDENT,
        })
    }

    fn spinner(&self, msg: &str) -> Spinner {
        Spinner::start(&self.prefix(), msg, self.color_choice != ColorChoice::Never)
    }
}

/// Progress indicator for a long-running step.
///
/// Dropping a spinner without finishing it clears the line.
pub struct Spinner {
    /// Underlying progress bar.
    bar: ProgressBar,
    /// Whether finish lines are colored.
    color: bool,
}

impl Spinner {
    /// Start a visible spinner on stderr.
    fn start(prefix: &str, msg: &str, color: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{prefix}{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(prefix.to_string());
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(TICK);
        Self { bar, color }
    }

    /// A spinner that never draws.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            color: false,
        }
    }

    /// Stop with a success line.
    pub fn finish_success(self, msg: &str) {
        self.finish_with("✔", msg, "green");
    }

    /// Stop with a failure line.
    pub fn finish_fail(self, msg: &str) {
        self.finish_with("✘", msg, "red");
    }

    /// Stop and erase the spinner line.
    pub fn finish_clear(self) {
        self.bar.finish_and_clear();
    }

    /// Replace the spinner with a final `mark msg` line, the mark styled
    /// `color` when color output is on.
    ///
    /// indicatif draws the last tick string once a spinner is finished.
    fn finish_with(&self, mark: &str, msg: &str, color: &str) {
        let template = if self.color {
            format!("{{prefix}}{{spinner:.{color}}} {{msg}}")
        } else {
            "{prefix}{spinner} {msg}".to_string()
        };
        let style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&[mark, mark]);
        self.bar.set_style(style);
        self.bar.finish_with_message(msg.to_string());
    }

    /// Whether the spinner has been stopped.
    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_accepts_everything() {
        let quiet = Quiet;
        quiet.message("hello").unwrap();
        quiet.success("done").unwrap();
        quiet.warn("careful").unwrap();
        quiet.fail("broken").unwrap();
        quiet.item("view", "clearcase-vob1-rel1-view1").unwrap();
        quiet.finish().unwrap();

        let section = quiet.section("nested");
        section.message("inner").unwrap();
    }

    #[test]
    fn test_quiet_spinner_is_hidden() {
        let spinner = Quiet.spinner("working");
        assert!(!spinner.is_finished());
        spinner.finish_clear();
    }

    #[test]
    fn test_spinner_finishes() {
        let spinner = Spinner::hidden();
        spinner.finish_success("ok");

        let spinner = Spinner::hidden();
        spinner.finish_fail("nope");
    }

    #[test]
    fn test_finish_marks_the_spinner_finished() {
        for color in [false, true] {
            let spinner = Spinner {
                bar: ProgressBar::hidden(),
                color,
            };
            spinner.finish_with("✔", "done", "green");
            assert!(spinner.is_finished());
            assert_eq!(spinner.bar.message(), "done");
        }
    }

    #[test]
    fn test_section_creates_indented_output() {
        let terminal = Terminal::new(false);
        assert_eq!(terminal.indent, 0);
        assert_eq!(terminal.prefix(), "");

        let section1 = terminal.section("Section 1");
        section1
            .message("Test message")
            .expect("section message succeeds");

        let section2 = section1.section("Section 2");
        section2
            .item("archive", "downloads/clearcase-vob1-rel1.tar.gz")
            .expect("nested section item succeeds");
    }
}
