// Extraction service launchers
//
// yt-dlp can run as a native binary or as `python -m yt_dlp`.
// The resolver picks one per run based on ExtractorMode and what is installed.

mod orchestrator;
mod traits;

pub use orchestrator::LauncherResolver;
pub use traits::{ExtractorConfig, ExtractorMode, Launcher};
