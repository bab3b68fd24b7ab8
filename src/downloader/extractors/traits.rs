// Launcher configuration for the yt-dlp extraction service

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How yt-dlp is launched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorMode {
    /// Native `yt-dlp` executable
    Binary,
    /// `python -m yt_dlp`
    Python,
    /// Binary when present, otherwise the Python module
    #[default]
    Auto,
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Python => write!(f, "python"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ExtractorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "cli" => Ok(Self::Binary),
            "python" => Ok(Self::Python),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown mode '{}', expected auto, binary or python", other)),
        }
    }
}

/// Configuration for talking to yt-dlp
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfig {
    pub mode: ExtractorMode,
    /// Explicit yt-dlp executable
    pub ytdlp_path: Option<PathBuf>,
    /// Interpreter for Python mode
    pub python_path: Option<PathBuf>,
    /// Explicit ffmpeg executable, forwarded as --ffmpeg-location
    pub ffmpeg_path: Option<PathBuf>,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<PathBuf>,
    /// Browser to read cookies from
    pub cookies_from_browser: Option<String>,
    /// yt-dlp socket timeout in seconds
    pub socket_timeout: Option<u32>,
    /// Wall-clock limit for the metadata query; none by default
    pub info_timeout: Option<u64>,
}

impl ExtractorConfig {
    pub fn with_mode(mut self, mode: ExtractorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_ytdlp_path(mut self, path: Option<PathBuf>) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_python_path(mut self, path: Option<PathBuf>) -> Self {
        self.python_path = path;
        self
    }

    pub fn with_ffmpeg_path(mut self, path: Option<PathBuf>) -> Self {
        self.ffmpeg_path = path;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<PathBuf>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_cookies_from_browser(mut self, browser: Option<String>) -> Self {
        self.cookies_from_browser = browser;
        self
    }

    pub fn with_socket_timeout(mut self, seconds: Option<u32>) -> Self {
        self.socket_timeout = seconds;
        self
    }

    pub fn with_info_timeout(mut self, seconds: Option<u64>) -> Self {
        self.info_timeout = seconds;
        self
    }

    /// Flags shared by the metadata query and the download
    pub fn network_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(timeout) = self.socket_timeout {
            args.push("--socket-timeout".to_string());
            args.push(timeout.to_string());
        }

        if let Some(path) = &self.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.to_string_lossy().into_owned());
        } else if let Some(browser) = &self.cookies_from_browser {
            args.push("--cookies-from-browser".to_string());
            args.push(browser.clone());
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args
    }
}

/// A resolved way to start yt-dlp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    Binary(PathBuf),
    PythonModule(PathBuf),
}

impl Launcher {
    pub fn program(&self) -> &Path {
        match self {
            Self::Binary(path) | Self::PythonModule(path) => path,
        }
    }

    /// Arguments that precede the yt-dlp options
    pub fn base_args(&self) -> Vec<String> {
        match self {
            Self::Binary(_) => Vec::new(),
            Self::PythonModule(_) => vec!["-m".to_string(), "yt_dlp".to_string()],
        }
    }

    pub fn mode(&self) -> ExtractorMode {
        match self {
            Self::Binary(_) => ExtractorMode::Binary,
            Self::PythonModule(_) => ExtractorMode::Python,
        }
    }
}

impl fmt::Display for Launcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary(path) => write!(f, "{}", path.display()),
            Self::PythonModule(path) => write!(f, "{} -m yt_dlp", path.display()),
        }
    }
}
