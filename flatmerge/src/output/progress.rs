//! Progress bar for page flattening.
//!
//! The bar is drawn on stderr so that machine-readable output on stdout
//! stays clean, and only when stderr is a terminal.
//!
//! # Examples
//!
//! ```
//! use flatmerge::output::progress::{ProgressBar, ProgressStyle};
//!
//! let mut progress = ProgressBar::new(12, ProgressStyle::Bar);
//! progress.set_message("Flattening");
//!
//! for page in 1..=12 {
//!     progress.update(page);
//! }
//!
//! progress.finish();
//! ```

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use crate::merge::PageProgress;

/// Style of progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// Classic progress bar: [=====>    ]
    Bar,
    /// Simple counter: 42/100
    Counter,
}

/// Progress bar for visual feedback while pages are flattened.
pub struct ProgressBar {
    total: usize,
    current: usize,
    style: ProgressStyle,
    message: Option<String>,
    start_time: Instant,
    last_update: Instant,
    /// Minimum time between redraws.
    update_interval: Duration,
    enabled: bool,
}

impl ProgressBar {
    /// Create a new progress bar.
    pub fn new(total: usize, style: ProgressStyle) -> Self {
        Self {
            total,
            current: 0,
            style,
            message: None,
            start_time: Instant::now(),
            last_update: Instant::now(),
            update_interval: Duration::from_millis(100),
            enabled: io::stderr().is_terminal(),
        }
    }

    /// Create a bar counting output pages.
    pub fn for_pages(total_pages: usize) -> Self {
        let mut bar = Self::new(total_pages, ProgressStyle::Bar);
        bar.set_message("Flattening");
        bar
    }

    /// Create a disabled progress bar (no output).
    pub fn disabled() -> Self {
        let mut pb = Self::new(0, ProgressStyle::Counter);
        pb.enabled = false;
        pb
    }

    /// Set the message shown in front of the bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Update the progress bar to a specific value.
    pub fn update(&mut self, current: usize) {
        self.current = current;

        if self.last_update.elapsed() < self.update_interval && current < self.total {
            return;
        }

        self.last_update = Instant::now();
        self.render();
    }

    /// Advance from a merge progress report.
    pub fn observe(&mut self, progress: &PageProgress) {
        self.total = progress.total_pages;
        self.set_message(format!(
            "Flattening document {} page {}",
            progress.document_index + 1,
            progress.page_index + 1
        ));
        self.update(progress.pages_done);
    }

    /// Mark the progress bar as finished and move to a new line.
    pub fn finish(&mut self) {
        self.current = self.total;
        if self.enabled {
            self.render();
            eprintln!();
        }
    }

    /// Erase the bar from the terminal.
    pub fn clear(&self) {
        if self.enabled {
            eprint!("\r\x1b[K");
            io::stderr().flush().ok();
        }
    }

    fn render(&self) {
        if !self.enabled {
            return;
        }

        let line = match self.style {
            ProgressStyle::Bar => self.render_bar(),
            ProgressStyle::Counter => self.render_counter(),
        };

        eprint!("\r\x1b[K{line}");
        io::stderr().flush().ok();
    }

    fn render_bar(&self) -> String {
        const WIDTH: usize = 30;
        let filled = (WIDTH * self.current) / self.total.max(1);
        let head = if filled > 0 && filled < WIDTH { ">" } else { "" };
        let body = "=".repeat(filled.saturating_sub(head.len()));

        let mut line = format!(
            "[{body}{head}{}] {:>3.0}% {}/{} {}",
            " ".repeat(WIDTH - filled.min(WIDTH)),
            self.percent(),
            self.current,
            self.total,
            format_duration(self.elapsed())
        );
        if let Some(msg) = &self.message {
            line = format!("{msg} {line}");
        }
        line
    }

    fn render_counter(&self) -> String {
        let counter = format!(
            "{}/{} {}",
            self.current,
            self.total,
            format_duration(self.elapsed())
        );
        match &self.message {
            Some(msg) => format!("{msg} {counter}"),
            None => counter,
        }
    }

    /// Current progress percentage.
    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
