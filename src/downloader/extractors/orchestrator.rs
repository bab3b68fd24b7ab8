// Launcher resolution - picks how yt-dlp is started
//
// Strategy:
// 1. Binary mode: explicit path, then PATH and common install dirs
// 2. Python mode: interpreter must be able to import yt_dlp
// 3. Auto: binary first, Python module as fallback
//
// Resolution happens once per run. A failing run is never retried with the other launcher.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use super::traits::{ExtractorConfig, ExtractorMode, Launcher};
use crate::downloader::errors::DownloadError;
use crate::downloader::tools::{ToolManager, ToolType};

const INSTALL_HINT: &str = "Install yt-dlp: pip install -U yt-dlp (or see https://github.com/yt-dlp/yt-dlp#installation)";

pub struct LauncherResolver<'a> {
    tools: &'a ToolManager,
}

impl<'a> LauncherResolver<'a> {
    pub fn new(tools: &'a ToolManager) -> Self {
        Self { tools }
    }

    pub fn resolve(&self, config: &ExtractorConfig) -> Result<Launcher, DownloadError> {
        let launcher = match config.mode {
            ExtractorMode::Binary => self.binary(config).ok_or_else(|| {
                DownloadError::ToolNotFound(format!("yt-dlp binary not found. {}", INSTALL_HINT))
            })?,
            ExtractorMode::Python => self.python_module(config).ok_or_else(|| {
                DownloadError::ToolNotFound(format!("Python yt_dlp module not importable. {}", INSTALL_HINT))
            })?,
            ExtractorMode::Auto => self
                .binary(config)
                .or_else(|| self.python_module(config))
                .ok_or_else(|| {
                    DownloadError::ToolNotFound(format!(
                        "Neither a yt-dlp binary nor the Python yt_dlp module is available. {}",
                        INSTALL_HINT
                    ))
                })?,
        };

        info!("Using yt-dlp via {} ({} mode)", launcher, launcher.mode());
        Ok(launcher)
    }

    fn binary(&self, config: &ExtractorConfig) -> Option<Launcher> {
        self.tools
            .find(ToolType::YtDlp, config.ytdlp_path.as_deref())
            .map(Launcher::Binary)
    }

    fn python_module(&self, config: &ExtractorConfig) -> Option<Launcher> {
        let python: PathBuf = self.tools.find(ToolType::Python, config.python_path.as_deref())?;
        if has_ytdlp_module(&python) {
            Some(Launcher::PythonModule(python))
        } else {
            debug!("{} cannot import yt_dlp", python.display());
            None
        }
    }
}

/// Check if the interpreter can import yt_dlp
fn has_ytdlp_module(python: &Path) -> bool {
    Command::new(python)
        .args(["-c", "import yt_dlp"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_auto_prefers_binary() {
        let bin = tempfile::tempdir().unwrap();
        let ytdlp = script(bin.path(), "yt-dlp", "exit 0");
        script(bin.path(), "python3", "exit 0");

        let tools = ToolManager::with_search_path(bin.path());
        let launcher = LauncherResolver::new(&tools)
            .resolve(&ExtractorConfig::default())
            .unwrap();
        assert_eq!(launcher, Launcher::Binary(ytdlp));
    }

    #[test]
    fn test_auto_falls_back_to_python_module() {
        let bin = tempfile::tempdir().unwrap();
        let python = script(bin.path(), "python3", "exit 0");

        let tools = ToolManager::with_search_path(bin.path());
        let launcher = LauncherResolver::new(&tools)
            .resolve(&ExtractorConfig::default())
            .unwrap();
        assert_eq!(launcher, Launcher::PythonModule(python));
    }

    #[test]
    fn test_python_without_module_is_not_found() {
        let bin = tempfile::tempdir().unwrap();
        script(bin.path(), "python3", "exit 1");

        let tools = ToolManager::with_search_path(bin.path());
        let config = ExtractorConfig::default().with_mode(ExtractorMode::Python);
        let err = LauncherResolver::new(&tools).resolve(&config).unwrap_err();
        assert!(matches!(err, DownloadError::ToolNotFound(_)));
    }

    #[test]
    fn test_binary_mode_ignores_python() {
        let bin = tempfile::tempdir().unwrap();
        script(bin.path(), "python3", "exit 0");

        let tools = ToolManager::with_search_path(bin.path());
        let config = ExtractorConfig::default().with_mode(ExtractorMode::Binary);
        assert!(LauncherResolver::new(&tools).resolve(&config).is_err());
    }
}
