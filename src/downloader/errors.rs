// Error types for the extraction service and the download session

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// yt-dlp (binary or python module) could not be located
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The extraction service does not recognise the URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Child process could not be started or waited on
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// The metadata query exceeded the configured wall-clock limit
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// yt-dlp ran and reported a failure
    #[error("{0}")]
    Extraction(String),

    /// stdin reached end of input while a prompt was waiting
    #[error("Input closed before a choice was made")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Raw message without the variant prefix, used for diagnostics
    pub fn detail(&self) -> String {
        match self {
            Self::ToolNotFound(s)
            | Self::InvalidUrl(s)
            | Self::ParseError(s)
            | Self::ExecutionError(s)
            | Self::Extraction(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// Classify yt-dlp stderr text
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        let trimmed = s.trim().to_string();
        let lower = trimmed.to_lowercase();

        if lower.contains("unsupported url") || lower.contains("is not a valid url") {
            return Self::InvalidUrl(trimmed);
        }

        if lower.contains("no such file") || lower.contains("command not found") {
            return Self::ToolNotFound(trimmed);
        }

        if lower.contains("invalid json") || lower.contains("jsondecodeerror") {
            return Self::ParseError(trimmed);
        }

        Self::Extraction(trimmed)
    }
}

impl From<&str> for DownloadError {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}
