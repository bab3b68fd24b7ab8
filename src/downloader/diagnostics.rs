// Failure diagnostics - turns yt-dlp error text into a reason and a hint
//
// Printing only: nothing here retries or changes the request.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    UnsupportedUrl,
    PrivateVideo,
    VideoUnavailable,
    GeoBlocked,
    AgeRestricted,
    RateLimited,
    Http403Forbidden,
    Network,
    MissingFormat,
    Unknown,
}

impl FailureReason {
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnsupportedUrl => "URL not supported by yt-dlp",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::GeoBlocked => "Geographic restriction",
            Self::AgeRestricted => "Age-restricted content",
            Self::RateLimited => "Rate limited",
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::Network => "Network problem",
            Self::MissingFormat => "Requested format not available",
            Self::Unknown => "Unknown failure",
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedUrl => Some("Check the URL. Quote it if it contains '&'."),
            Self::PrivateVideo | Self::AgeRestricted => {
                Some("Pass --cookies or --cookies-from-browser from an account with access.")
            }
            Self::GeoBlocked => Some("Try --proxy with a server in an allowed region."),
            Self::RateLimited | Self::Http403Forbidden => {
                Some("Wait a while, update yt-dlp, or try --proxy.")
            }
            Self::Network => Some("Check your connection or raise --socket-timeout."),
            Self::MissingFormat => Some("Pick another quality; the listing may be stale."),
            Self::VideoUnavailable | Self::Unknown => None,
        }
    }
}

/// Classify an error message. Empty input has no reason.
pub fn diagnose_error(error: &str) -> Option<FailureReason> {
    let lower = error.to_lowercase();

    if lower.trim().is_empty() {
        return None;
    }

    if lower.contains("unsupported url") || lower.contains("is not a valid url") {
        return Some(FailureReason::UnsupportedUrl);
    }

    if lower.contains("private video") || lower.contains("video is private") {
        return Some(FailureReason::PrivateVideo);
    }

    if lower.contains("available in your country") || lower.contains("blocked in your country") {
        return Some(FailureReason::GeoBlocked);
    }

    if lower.contains("age-restricted") || lower.contains("confirm your age") {
        return Some(FailureReason::AgeRestricted);
    }

    if lower.contains("video unavailable")
        || lower.contains("video has been removed")
        || lower.contains("no longer available")
    {
        return Some(FailureReason::VideoUnavailable);
    }

    if lower.contains("requested format is not available") {
        return Some(FailureReason::MissingFormat);
    }

    if lower.contains("429") || lower.contains("too many requests") {
        return Some(FailureReason::RateLimited);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(FailureReason::Http403Forbidden);
    }

    if lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network is unreachable")
        || lower.contains("name or service not known")
        || lower.contains("getaddrinfo failed")
    {
        return Some(FailureReason::Network);
    }

    Some(FailureReason::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_403_detection() {
        let error = "ERROR: unable to download video data: HTTP Error 403: Forbidden";
        assert_eq!(diagnose_error(error), Some(FailureReason::Http403Forbidden));
    }

    #[test]
    fn test_unsupported_url_detection() {
        let error = "ERROR: Unsupported URL: https://example.com/page";
        assert_eq!(diagnose_error(error), Some(FailureReason::UnsupportedUrl));
        assert!(FailureReason::UnsupportedUrl.hint().is_some());
    }

    #[test]
    fn test_private_detection() {
        let error = "ERROR: [youtube] abc: Private video. Sign in if you've been granted access";
        assert_eq!(diagnose_error(error), Some(FailureReason::PrivateVideo));
    }

    #[test]
    fn test_geo_detection() {
        let error = "The uploader has not made this video available in your country";
        assert_eq!(diagnose_error(error), Some(FailureReason::GeoBlocked));
    }

    #[test]
    fn test_timeout_detection() {
        assert_eq!(diagnose_error("Read timed out."), Some(FailureReason::Network));
    }

    #[test]
    fn test_missing_format_detection() {
        let error = "ERROR: [youtube] abc: Requested format is not available.";
        assert_eq!(diagnose_error(error), Some(FailureReason::MissingFormat));
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(diagnose_error("something odd"), Some(FailureReason::Unknown));
        assert_eq!(diagnose_error("   "), None);
        assert!(FailureReason::Unknown.hint().is_none());
    }
}
