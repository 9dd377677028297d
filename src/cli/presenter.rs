//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::session::{RecorderPhase, RecorderStatus};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Render a recorder status change.
    /// Active phases drive the spinner; terminal phases finish it.
    pub fn show_status(&mut self, status: &RecorderStatus) {
        let line = format_status_line(status);
        match status.phase {
            RecorderPhase::Listening | RecorderPhase::Processing => {
                if self.spinner.is_some() {
                    self.update_spinner(&line);
                } else {
                    self.start_spinner(&line);
                }
            }
            RecorderPhase::Complete => self.spinner_success(&line),
            RecorderPhase::Error => self.spinner_fail(&line),
            RecorderPhase::Idle => self.info(&line),
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout (the actual result output)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Output text to stdout without newline
    pub fn output_inline(&self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// One line combining the primary message and the detail
fn format_status_line(status: &RecorderStatus) -> String {
    if status.detail.is_empty() {
        status.message.clone()
    } else {
        format!("{} - {}", status.message, status.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(phase: RecorderPhase, message: &str, detail: &str) -> RecorderStatus {
        RecorderStatus {
            phase,
            message: message.to_string(),
            detail: detail.to_string(),
        }
    }

    #[test]
    fn status_line_joins_message_and_detail() {
        let s = status(RecorderPhase::Listening, "Listening...", "Speak now");
        assert_eq!(format_status_line(&s), "Listening... - Speak now");
    }

    #[test]
    fn status_line_without_detail() {
        let s = status(RecorderPhase::Complete, "Done", "");
        assert_eq!(format_status_line(&s), "Done");
    }

    #[test]
    fn terminal_status_clears_spinner() {
        let mut presenter = Presenter::new();
        presenter.show_status(&status(RecorderPhase::Listening, "Listening...", ""));
        assert!(presenter.spinner.is_some());

        presenter.show_status(&status(RecorderPhase::Complete, "Done", "hi"));
        assert!(presenter.spinner.is_none());
    }

    #[test]
    fn error_status_clears_spinner() {
        let mut presenter = Presenter::new();
        presenter.show_status(&status(RecorderPhase::Processing, "Processing...", ""));
        presenter.show_status(&status(RecorderPhase::Error, "Upload failed", "refused"));
        assert!(presenter.spinner.is_none());
    }
}
