// Common data models for the downloader

use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Codec value yt-dlp uses for a missing stream
pub const NO_CODEC: &str = "none";

/// Default yt-dlp output template (title + extension, no id suffix)
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// One downloadable stream variant as reported by yt-dlp
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Format {
    /// Format ID (e.g., "137", "140")
    pub format_id: String,
    /// Video codec (avc1, vp9, av01, none)
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    pub acodec: Option<String>,
    /// Video height in pixels
    #[serde(deserialize_with = "lenient_u32")]
    pub height: Option<u32>,
    /// Frames per second
    pub fps: Option<f64>,
    /// Audio bitrate in kbps
    pub abr: Option<f64>,
    /// Resolution string (e.g., "1920x1080", "audio only")
    pub resolution: Option<String>,
    /// Format note (e.g., "1080p", "medium")
    pub format_note: Option<String>,
}

impl Format {
    /// Only the literal "none" marks a missing video stream.
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some(NO_CODEC)
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some(NO_CODEC)
    }

    pub fn is_audio_only(&self) -> bool {
        !self.has_video() && self.has_audio()
    }

    /// Audio bitrate with absent treated as zero
    pub fn audio_bitrate(&self) -> f64 {
        self.abr.unwrap_or(0.0)
    }

    pub fn resolution_or_unknown(&self) -> &str {
        self.resolution.as_deref().unwrap_or("Unknown")
    }
}

/// Title plus the ordered format list for one URL
#[derive(Debug, Clone, Deserialize)]
pub struct VideoInfo {
    #[serde(default = "unknown_title")]
    pub title: String,
    pub formats: Vec<Format>,
}

fn unknown_title() -> String {
    "Unknown".to_string()
}

// yt-dlp occasionally reports integral fields as floats
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_f64())
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u32))
}

/// Options for one download session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Directory the output file lands in
    pub output_dir: PathBuf,
    /// yt-dlp output template
    pub output_template: String,
    /// Offer the fallback menu when a merge is needed but ffmpeg is missing
    pub check_muxer: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            check_muxer: true,
        }
    }
}

/// Download progress information parsed from yt-dlp output
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    pub percent: f32,
    pub status: String,
}
