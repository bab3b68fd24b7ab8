use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
    Python,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
            ToolType::Python => "python3",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::Ffmpeg => "-version", // ffmpeg uses a single dash
            ToolType::YtDlp | ToolType::Python => "--version",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: Option<PathBuf>,
    pub is_available: bool,
}

/// Locates external executables on PATH and a few well-known install dirs.
#[derive(Debug, Clone)]
pub struct ToolManager {
    search_path: Option<OsString>,
    extra_dirs: Vec<PathBuf>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self {
            search_path: std::env::var_os("PATH"),
            extra_dirs: vec![
                PathBuf::from("/opt/homebrew/bin"), // Homebrew on Apple Silicon
                PathBuf::from("/usr/local/bin"),    // Homebrew on Intel Mac
                PathBuf::from("/usr/bin"),
            ],
        }
    }

    /// Lookup restricted to the given PATH-style value
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
            extra_dirs: Vec::new(),
        }
    }

    /// Fallback dirs for tools this program launches by full path
    pub fn with_install_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.extra_dirs = dirs;
        self
    }

    /// Resolve a tool: explicit override first, then PATH, then known dirs.
    /// ffmpeg is only looked up on PATH, where yt-dlp itself looks for it.
    /// Never runs the tool.
    pub fn find(&self, tool_type: ToolType, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            if is_executable(path) {
                return Some(path.to_path_buf());
            }
            debug!("Configured {} path {} is not executable", tool_type.as_str(), path.display());
            return None;
        }

        let binary_name = executable_name(tool_type.as_str());
        let path_dirs = self
            .search_path
            .as_ref()
            .map(|p| std::env::split_paths(p).collect::<Vec<_>>())
            .unwrap_or_default();
        let install_dirs: &[PathBuf] = match tool_type {
            ToolType::Ffmpeg => &[],
            ToolType::YtDlp | ToolType::Python => &self.extra_dirs,
        };

        path_dirs
            .iter()
            .chain(install_dirs.iter())
            .map(|dir| dir.join(&binary_name))
            .find(|candidate| is_executable(candidate))
    }

    pub fn is_available(&self, tool_type: ToolType, explicit: Option<&Path>) -> bool {
        self.find(tool_type, explicit).is_some()
    }

    pub fn get_tool_info(&self, tool_type: ToolType, explicit: Option<&Path>) -> ToolInfo {
        let path = self.find(tool_type, explicit);
        let version = path.as_deref().and_then(|p| Self::get_version(p, tool_type));

        ToolInfo {
            name: tool_type.as_str().to_string(),
            tool_type,
            version,
            is_available: path.is_some(),
            path,
        }
    }

    fn get_version(path: &Path, tool_type: ToolType) -> Option<String> {
        match Command::new(path).arg(tool_type.version_arg()).output() {
            Ok(output) if output.status.success() => {
                let out = String::from_utf8_lossy(&output.stdout);
                // ffmpeg prints a banner; keep the first line
                out.lines().next().map(|l| l.trim().to_string())
            }
            _ => None,
        }
    }
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
