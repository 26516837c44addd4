use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Kinds of long-running work shown with a spinner
#[derive(Debug, Clone, Copy)]
pub enum ProgressType {
    /// Catalog reads and writes against the hosted database
    Catalog,
    /// Photo uploads to storage
    Upload,
    /// Multimodal comparison, usually several seconds
    Analysis,
    /// Assistant reply
    Assistant,
}

impl ProgressType {
    fn spinner_chars(self) -> &'static str {
        match self {
            ProgressType::Catalog => "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏",
            ProgressType::Upload => "⠋⠙⠚⠞⠖⠦⠴⠲⠳⠓",
            ProgressType::Analysis => "⠋⠙⠚⠒⠂⠂⠒⠲⠴⠦⠖⠒⠐⠐⠒⠓⠋",
            ProgressType::Assistant => "◐◓◑◒",
        }
    }

    pub fn tick_interval(self) -> Duration {
        match self {
            ProgressType::Catalog => Duration::from_millis(80),
            ProgressType::Upload => Duration::from_millis(120),
            ProgressType::Analysis => Duration::from_millis(150),
            ProgressType::Assistant => Duration::from_millis(200),
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ProgressType::Catalog => "cyan",
            ProgressType::Upload => "blue",
            ProgressType::Analysis => "yellow",
            ProgressType::Assistant => "magenta",
        }
    }

    pub fn create_spinner(self, message: &str) -> AdaptiveSpinner {
        let spinner = ProgressBar::new_spinner();
        let template = format!("{{spinner:.{}}} {{msg}}", self.color());
        let style = ProgressStyle::default_spinner()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(self.spinner_chars());

        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(self.tick_interval());

        AdaptiveSpinner { spinner }
    }
}

/// Spinner on stderr that leaves a one-line outcome behind
pub struct AdaptiveSpinner {
    spinner: ProgressBar,
}

impl AdaptiveSpinner {
    pub fn set_message(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }

    pub fn finish_success(&self, message: &str) {
        self.spinner
            .finish_with_message(format!("{} {}", "✓".green(), message));
    }

    pub fn finish_error(&self, message: &str) {
        self.spinner
            .finish_with_message(format!("{} {}", "✗".red(), message.red()));
    }

    pub fn is_finished(&self) -> bool {
        self.spinner.is_finished()
    }

    pub fn finish_and_clear(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for AdaptiveSpinner {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
