//! Message formatting and display.
//!
//! Messages are leveled and respect quiet/verbose settings. Warnings and
//! errors go to stderr; everything else goes to stdout unless the formatter
//! was told stdout is reserved for a machine-readable report.
//!
//! # Examples
//!
//! ```
//! use flatmerge::output::formatter::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Registering 3 file(s)");
//! formatter.success("Wrote flattened.pdf");
//! formatter.warning("Skipping scan.pdf: not a PDF");
//! ```

use std::io::{self, IsTerminal};

use crate::config::Config;

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
    /// Debug/verbose message.
    Debug,
}

impl MessageLevel {
    fn prefix(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
            Self::Debug => "→ ",
        }
    }

    fn color(self) -> Option<&'static str> {
        match self {
            Self::Info => None,
            Self::Success => Some("\x1b[32m"),
            Self::Warning => Some("\x1b[33m"),
            Self::Error => Some("\x1b[31m"),
            Self::Debug => Some("\x1b[36m"),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// Output formatter with configurable verbosity.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    /// Send every message to stderr, leaving stdout to a report.
    stdout_reserved: bool,
    color_stdout: bool,
    color_stderr: bool,
}

impl OutputFormatter {
    /// Create a new output formatter.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            stdout_reserved: false,
            color_stdout: use_color(io::stdout().is_terminal()),
            color_stderr: use_color(io::stderr().is_terminal()),
        }
    }

    /// Create a formatter from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Create a quiet formatter (only warnings and errors).
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    /// Create a verbose formatter.
    pub fn verbose() -> Self {
        Self::new(false, true)
    }

    /// Route every message to stderr.
    pub fn reserve_stdout(mut self) -> Self {
        self.stdout_reserved = true;
        self
    }

    /// Print an informational message. Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Print a success message. Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning message, even in quiet mode.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Print a message only in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    /// Print a section header. Suppressed in quiet mode.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            self.emit(false, &format!("\n{title}"));
        }
    }

    /// Print a labelled value in verbose mode.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            self.emit(false, &format!("  {label}: {value}"));
        }
    }

    /// Print a numbered list item (1-based). Suppressed in quiet mode.
    pub fn list_item(&self, index: usize, message: &str) {
        if !self.quiet {
            self.emit(false, &format!("  {index}. {message}"));
        }
    }

    /// Check if non-error output is shown.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Check if verbose output is shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Render a message line as it would be printed, without color.
    pub fn format_message(level: MessageLevel, message: &str) -> String {
        format!("{}{message}", level.prefix())
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let to_stderr = level.to_stderr() || self.stdout_reserved;
        let colored = if to_stderr {
            self.color_stderr
        } else {
            self.color_stdout
        };

        let line = Self::format_message(level, message);
        match level.color() {
            Some(code) if colored => self.emit(to_stderr, &format!("{code}{line}\x1b[0m")),
            _ => self.emit(to_stderr, &line),
        }
    }

    fn emit(&self, to_stderr: bool, line: &str) {
        if to_stderr || self.stdout_reserved {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

fn use_color(is_terminal: bool) -> bool {
    is_terminal && std::env::var_os("TERM").is_some() && std::env::var_os("NO_COLOR").is_none()
}
