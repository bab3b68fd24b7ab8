use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use thiserror::Error;

use crate::downloader::extractors::{ExtractorConfig, ExtractorMode};
use crate::downloader::models::{SessionOptions, DEFAULT_OUTPUT_TEMPLATE};

/// Pick a video quality interactively and download it with yt-dlp
#[derive(Parser, Debug)]
#[command(name = "yt-picker")]
#[command(version)]
#[command(about = "Pick a video quality interactively and download it with yt-dlp", long_about = None)]
pub struct Cli {
    /// Video URL. Pieces split by the shell on '&' are joined back together
    #[arg(value_name = "URL")]
    #[arg(value_hint = clap::ValueHint::Url)]
    pub url: Vec<String>,

    /// Require exactly one URL argument instead of re-joining pieces
    #[arg(long)]
    pub strict_args: bool,

    /// Directory the download is saved to
    #[arg(short = 'o', long, value_name = "DIR")]
    #[arg(default_value = ".")]
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub output_dir: PathBuf,

    /// yt-dlp output template
    #[arg(long, value_name = "TEMPLATE")]
    #[arg(default_value = DEFAULT_OUTPUT_TEMPLATE)]
    pub output_template: String,

    /// How to launch yt-dlp: auto, binary or python
    #[arg(long, value_name = "MODE", default_value = "auto")]
    pub mode: ExtractorMode,

    /// yt-dlp executable
    #[arg(long = "yt-dlp", value_name = "PATH", env = "YTDLP_PATH")]
    pub ytdlp_path: Option<PathBuf>,

    /// Python interpreter for python mode
    #[arg(long = "python", value_name = "PATH", env = "YTDLP_PYTHON")]
    pub python_path: Option<PathBuf>,

    /// ffmpeg executable used for merging
    #[arg(long = "ffmpeg", value_name = "PATH", env = "FFMPEG_PATH")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Proxy URL passed to yt-dlp
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Netscape cookies.txt file passed to yt-dlp
    #[arg(long, value_name = "FILE")]
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub cookies: Option<PathBuf>,

    /// Browser to load cookies from (chrome, firefox, ...)
    #[arg(long, value_name = "BROWSER", conflicts_with = "cookies")]
    pub cookies_from_browser: Option<String>,

    /// Socket timeout passed to yt-dlp, in seconds
    #[arg(long, value_name = "SECS")]
    pub socket_timeout: Option<u32>,

    /// Give up on the metadata query after this many seconds
    #[arg(long, value_name = "SECS")]
    pub info_timeout: Option<u64>,

    /// Skip the ffmpeg check and always request a merge when one is needed
    #[arg(long)]
    pub no_muxer_check: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("missing URL argument")]
    MissingUrl,

    #[error("expected exactly one URL argument, got {0}")]
    TooManyArguments(usize),
}

impl Cli {
    /// The target URL, re-joined on '&' unless strict argument handling is on
    pub fn target_url(&self) -> Result<String, UsageError> {
        match (self.url.len(), self.strict_args) {
            (0, _) => Err(UsageError::MissingUrl),
            (1, _) => Ok(self.url[0].clone()),
            (n, true) => Err(UsageError::TooManyArguments(n)),
            (_, false) => Ok(self.url.join("&")),
        }
    }

    pub fn usage_text() -> String {
        let usage = Self::command().render_usage().to_string();
        format!(
            "{}\nQuote the URL to avoid shell splitting, e.g.:\n  yt-picker \"https://www.youtube.com/watch?v=...&pp=...\"",
            usage.trim_end()
        )
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig::default()
            .with_mode(self.mode)
            .with_ytdlp_path(self.ytdlp_path.clone())
            .with_python_path(self.python_path.clone())
            .with_ffmpeg_path(self.ffmpeg_path.clone())
            .with_proxy(self.proxy.clone())
            .with_cookies_path(self.cookies.clone())
            .with_cookies_from_browser(self.cookies_from_browser.clone())
            .with_socket_timeout(self.socket_timeout)
            .with_info_timeout(self.info_timeout)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            output_dir: self.output_dir.clone(),
            output_template: self.output_template.clone(),
            check_muxer: !self.no_muxer_check,
        }
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("yt-picker").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_single_url() {
        let cli = parse(&["https://www.youtube.com/watch?v=abc"]);
        assert_eq!(cli.target_url().unwrap(), "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_split_url_is_rejoined() {
        let cli = parse(&["https://www.youtube.com/watch?v=abc", "pp=xyz", "t=10"]);
        assert_eq!(
            cli.target_url().unwrap(),
            "https://www.youtube.com/watch?v=abc&pp=xyz&t=10"
        );
    }

    #[test]
    fn test_strict_args_rejects_extra_pieces() {
        let cli = parse(&["--strict-args", "https://youtu.be/abc", "pp=xyz"]);
        assert_eq!(cli.target_url(), Err(UsageError::TooManyArguments(2)));

        let ok = parse(&["--strict-args", "https://youtu.be/abc"]);
        assert!(ok.target_url().is_ok());
    }

    #[test]
    fn test_missing_url() {
        let cli = parse(&[]);
        assert_eq!(cli.target_url(), Err(UsageError::MissingUrl));
    }

    #[test]
    fn test_options_mapping() {
        let cli = parse(&[
            "-o",
            "out",
            "--mode",
            "python",
            "--proxy",
            "socks5://127.0.0.1:1080",
            "--no-muxer-check",
            "-vv",
            "https://youtu.be/abc",
        ]);

        let options = cli.session_options();
        assert_eq!(options.output_dir, PathBuf::from("out"));
        assert_eq!(options.output_template, DEFAULT_OUTPUT_TEMPLATE);
        assert!(!options.check_muxer);

        let config = cli.extractor_config();
        assert_eq!(config.mode, ExtractorMode::Python);
        assert_eq!(config.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
        assert_eq!(config.info_timeout, None);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_bad_mode_rejected() {
        assert!(Cli::try_parse_from(["yt-picker", "--mode", "lux", "https://youtu.be/abc"]).is_err());
    }

    #[test]
    fn test_usage_text_mentions_quoting() {
        let text = Cli::usage_text();
        assert!(text.starts_with("Usage: yt-picker"));
        assert!(text.contains("Quote the URL"));
    }
}
