// Extraction service trait definition

use async_trait::async_trait;
use std::path::PathBuf;

use super::errors::DownloadError;
use super::format_selector::FormatExpression;
use super::models::{DownloadProgress, VideoInfo};

/// Everything the download call needs besides the URL
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub expression: FormatExpression,
    pub output_dir: PathBuf,
    pub output_template: String,
}

/// Resolves URLs to metadata and downloads by format expression
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Name of the service (for logging)
    fn name(&self) -> &'static str;

    /// Metadata-only query: title plus ordered format records
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, DownloadError>;

    /// Download the selection described by `request`
    async fn download(
        &self,
        url: &str,
        request: &DownloadRequest,
        progress: &dyn ProgressSink,
    ) -> Result<(), DownloadError>;
}

/// Receives progress updates while a download runs
pub trait ProgressSink: Send + Sync {
    fn update(&self, progress: DownloadProgress);

    fn finish(&self) {}
}

/// Sink that drops every update
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _progress: DownloadProgress) {}
}
