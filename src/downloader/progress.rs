use indicatif::{ProgressBar, ProgressStyle};

use super::models::DownloadProgress;
use super::traits::ProgressSink;

/// Terminal progress bar driven by parsed yt-dlp output
pub struct TerminalProgress {
    pb: ProgressBar,
}

impl TerminalProgress {
    pub fn new() -> Self {
        let pb = ProgressBar::new(1000);
        pb.set_style(
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {wide_bar} {percent:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { pb }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn update(&self, progress: DownloadProgress) {
        // yt-dlp restarts at 0% for each stream of a merge
        let position = (progress.percent.clamp(0.0, 100.0) * 10.0) as u64;
        self.pb.set_position(position);
        self.pb.set_message(progress.status);
    }

    fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
