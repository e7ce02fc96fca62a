//! Transfer progress bars
//!
//! Bars are driven from the streaming body loop of each transfer. They are
//! hidden when disabled in the configuration or when stderr is not a terminal.

use indicatif::{ProgressBar, ProgressStyle};

/// Which way the bytes are flowing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Download,
    Upload,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::Download => "download",
            Direction::Upload => "upload",
        }
    }
}

/// Create a byte progress bar for a transfer of `total` bytes (0 = unknown)
pub fn transfer_bar(direction: Direction, filename: &str, total: u64, enabled: bool) -> ProgressBar {
    if !enabled || !atty::is(atty::Stream::Stderr) {
        return ProgressBar::hidden();
    }

    let bar = if total > 0 {
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template(
            "{prefix:.cyan} {msg} [{bar:30.green/white}] {bytes}/{total_bytes} {bytes_per_sec} {eta}",
        ) {
            bar.set_style(style.progress_chars("━╸ "));
        }
        bar
    } else {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {prefix:.cyan} {msg} {bytes}")
        {
            bar.set_style(style);
        }
        bar
    };

    bar.set_prefix(direction.label());
    bar.set_message(filename.to_string());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_bar_is_hidden() {
        let bar = transfer_bar(Direction::Download, "hello.zip", 1024, false);
        assert!(bar.is_hidden());
    }

    #[test]
    fn test_hidden_bar_still_counts() {
        let bar = transfer_bar(Direction::Upload, "hello.zip", 100, false);
        bar.inc(40);
        assert_eq!(bar.position(), 40);
    }
}
