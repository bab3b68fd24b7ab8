// Downloader module - format selection and session orchestration around yt-dlp

pub mod diagnostics;
pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod prompt;
pub mod tools;
pub mod traits;
pub mod utils;

pub use errors::DownloadError;
pub use format_selector::{FormatExpression, FormatSelector};
pub use models::{DownloadProgress, Format, SessionOptions, VideoInfo};
pub use orchestrator::{AbortReason, Outcome, Session, SessionError};
pub use traits::{DownloadRequest, ExtractionService, NoProgress, ProgressSink};
