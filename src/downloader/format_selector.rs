// FormatSelector - quality selection and yt-dlp format expressions
//
// Handles:
// - Best audio-only track detection (by bitrate)
// - Video candidate filtering and display ordering (height, fps)
// - Menu labels
// - Format-selection expression construction

use std::cmp::Ordering;
use std::fmt;

use super::models::Format;

/// Format-selection expression passed to `yt-dlp -f`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatExpression {
    /// Video-only track merged with a separate audio track
    Merge { video_id: String, audio_id: String },
    /// Chosen track already has audio, or there is no audio-only alternative
    WithFallback { video_id: String },
    /// Explicit video-only download (merge impossible without ffmpeg)
    VideoOnly { video_id: String },
}

impl fmt::Display for FormatExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge { video_id, audio_id } => write!(f, "{}+{}/bestaudio", video_id, audio_id),
            Self::WithFallback { video_id } => write!(f, "{}/best", video_id),
            Self::VideoOnly { video_id } => write!(f, "{}", video_id),
        }
    }
}

pub struct FormatSelector;

impl FormatSelector {
    /// Highest-bitrate audio-only format. Ties keep the first one seen.
    pub fn best_audio(formats: &[Format]) -> Option<&Format> {
        let mut best: Option<&Format> = None;
        for f in formats.iter().filter(|f| f.is_audio_only()) {
            match best {
                Some(current) if f.audio_bitrate() <= current.audio_bitrate() => {}
                _ => best = Some(f),
            }
        }
        best
    }

    /// Formats carrying video, ordered by (height, fps) descending.
    /// The sort is stable so equal keys keep their original order.
    pub fn video_formats(formats: &[Format]) -> Vec<Format> {
        let mut videos: Vec<Format> = formats.iter().filter(|f| f.has_video()).cloned().collect();
        videos.sort_by(Self::display_order);
        videos
    }

    /// Candidates for the quality menu; `only_progressive` keeps formats with audio.
    pub fn candidates(formats: &[Format], only_progressive: bool) -> Vec<&Format> {
        formats
            .iter()
            .filter(|f| f.has_video())
            .filter(|f| !only_progressive || f.has_audio())
            .collect()
    }

    fn display_order(a: &Format, b: &Format) -> Ordering {
        let height = |f: &Format| f.height.unwrap_or(0);
        let fps = |f: &Format| f.fps.unwrap_or(0.0);
        height(b)
            .cmp(&height(a))
            .then_with(|| fps(b).total_cmp(&fps(a)))
    }

    /// Menu label: "<resolution> <note> <fps>fps", empty parts dropped
    pub fn quality_label(format: &Format) -> String {
        let mut parts = vec![format.resolution_or_unknown().to_string()];
        if let Some(note) = format.format_note.as_deref().filter(|n| !n.trim().is_empty()) {
            parts.push(note.trim().to_string());
        }
        if let Some(fps) = format.fps {
            parts.push(format!("{}fps", Self::format_fps(fps)));
        }
        parts.join(" ")
    }

    fn format_fps(fps: f64) -> String {
        if fps.fract() == 0.0 {
            format!("{}", fps as i64)
        } else {
            format!("{}", fps)
        }
    }

    /// True when the chosen track lacks audio and a separate audio track exists
    pub fn needs_merge(chosen: &Format, best_audio: Option<&Format>) -> bool {
        best_audio.is_some() && !chosen.has_audio()
    }

    /// Expression for a chosen track when merging is possible
    pub fn build_expression(chosen: &Format, best_audio: Option<&Format>) -> FormatExpression {
        match best_audio {
            Some(audio) if !chosen.has_audio() => FormatExpression::Merge {
                video_id: chosen.format_id.clone(),
                audio_id: audio.format_id.clone(),
            },
            _ => FormatExpression::WithFallback {
                video_id: chosen.format_id.clone(),
            },
        }
    }
}
