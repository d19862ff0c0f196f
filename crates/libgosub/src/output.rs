use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use thiserror::Error;

/// Columns added per nested section.
const INDENT: usize = 4;

/// Errors produced by [`Output`] implementations when writing to the terminal.
#[derive(Debug, Error)]
pub enum OutputError {
    /// A spinner template could not be built.
    #[error("Spinner error: {0}")]
    Spinner(String),

    /// Underlying I/O error while writing to the terminal.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

/// Abstraction over how user-facing status lines are produced.
///
/// The engine reports what it is doing through this trait; the CLI decides
/// whether that ends up colored on a terminal or discarded.
pub trait Output: Send + Sync {
    /// Print an informational message.
    fn message(&self, msg: &str) -> Result<()>;
    /// Print a success message.
    fn success(&self, msg: &str) -> Result<()>;
    /// Print a warning message.
    fn warn(&self, msg: &str) -> Result<()>;
    /// Print an error/failure message.
    fn fail(&self, msg: &str) -> Result<()>;
    /// Start a spinner for a long-running operation.
    fn spinner(&self, msg: &str) -> Spinner;
    /// Flush any buffered output.
    fn finish(&self) -> Result<()>;
    /// Create a nested output section that indents subsequent messages.
    fn section(&self, header: &str) -> Box<dyn Output>;
}

/// Progress indicator for a single long-running git invocation.
pub struct Spinner {
    /// Backing progress bar; `None` when output is suppressed.
    bar: Option<ProgressBar>,
}

impl Spinner {
    /// A spinner that renders nothing.
    pub fn hidden() -> Self {
        Self { bar: None }
    }

    /// Start a ticking spinner with the given message.
    fn start(msg: &str, indent: usize) -> Result<Self> {
        let template = format!("{}{{spinner:.green}} {{msg}}", " ".repeat(indent));
        let style = ProgressStyle::default_spinner()
            .template(&template)
            .map_err(|e| OutputError::Spinner(e.to_string()))?;
        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Ok(Self { bar: Some(bar) })
    }

    /// Stop the spinner, leaving a success line.
    pub fn finish_success(self, msg: &str) {
        if let Some(bar) = self.bar {
            bar.finish_with_message(format!("✓ {msg}"));
        }
    }

    /// Stop the spinner, leaving a failure line.
    pub fn finish_fail(self, msg: &str) {
        if let Some(bar) = self.bar {
            bar.finish_with_message(format!("✗ {msg}"));
        }
    }
}

/// Output implementation that suppresses all messages.
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

    fn spinner(&self, _msg: &str) -> Spinner {
        Spinner::hidden()
    }

    fn finish(&self) -> Result<()> {
        Ok(())
    }

    fn section(&self, _header: &str) -> Box<dyn Output> {
        Box::new(Quiet)
    }
}

/// Color-capable terminal renderer for status lines.
pub struct Terminal {
    /// Whether ANSI colors are emitted.
    color_choice: ColorChoice,
    /// Leading spaces for each line.
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

    /// Write one indented line in `color`.
    fn write_colored(&self, msg: &str, color: Color) -> Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice);
        stdout.set_color(ColorSpec::new().set_fg(Some(color)))?;
        writeln!(stdout, "{}{msg}", " ".repeat(self.indent))?;
        stdout.reset()?;
        stdout.flush()?;
        Ok(())
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
        self.write_colored(msg, Color::Yellow)
    }

    fn fail(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Red)
    }

    fn spinner(&self, msg: &str) -> Spinner {
        // Fall back to a plain line when the template is rejected.
        Spinner::start(msg, self.indent).unwrap_or_else(|_| {
            let _ = self.message(msg);
            Spinner::hidden()
        })
    }

    fn finish(&self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn section(&self, header: &str) -> Box<dyn Output> {
        let _ = self.message(header);

        Box::new(Terminal {
            color_choice: self.color_choice,
            indent: self.indent + INDENT,
        })
    }
}
