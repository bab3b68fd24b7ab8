use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tracing::{debug, warn};

use crate::downloader::extractors::{ExtractorConfig, Launcher};
use crate::downloader::utils::{parse_ytdlp_progress, run_output_with_timeout, summarize_stderr};
use crate::downloader::{DownloadError, DownloadRequest, ExtractionService, ProgressSink, VideoInfo};

/// yt-dlp driven as a child process
pub struct YtDlp {
    launcher: Launcher,
    config: ExtractorConfig,
}

impl YtDlp {
    pub fn new(launcher: Launcher, config: ExtractorConfig) -> Self {
        Self { launcher, config }
    }

    /// Arguments for the metadata-only query
    pub fn info_args(&self, url: &str) -> Vec<String> {
        let mut args = self.launcher.base_args();
        args.extend([
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--youtube-include-dash-manifest".to_string(),
        ]);
        args.extend(self.config.network_args());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Arguments for the download call
    pub fn download_args(&self, url: &str, request: &DownloadRequest) -> Vec<String> {
        let mut args = self.launcher.base_args();
        args.extend([
            "-f".to_string(),
            request.expression.to_string(),
            "-P".to_string(),
            request.output_dir.to_string_lossy().into_owned(),
            "-o".to_string(),
            request.output_template.clone(),
            "--newline".to_string(),
            "--no-playlist".to_string(),
        ]);

        if let Some(ffmpeg) = &self.config.ffmpeg_path {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.to_string_lossy().into_owned());
        }

        args.extend(self.config.network_args());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Parse `--dump-json` output
    pub fn parse_info(stdout: &[u8]) -> Result<VideoInfo, DownloadError> {
        serde_json::from_slice(stdout)
            .map_err(|e| DownloadError::ParseError(format!("Invalid JSON from yt-dlp: {}", e)))
    }
}

#[async_trait]
impl ExtractionService for YtDlp {
    fn name(&self) -> &'static str {
        match self.launcher {
            Launcher::Binary(_) => "yt-dlp",
            Launcher::PythonModule(_) => "yt-dlp-python",
        }
    }

    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, DownloadError> {
        let args = self.info_args(url);
        debug!("[{}] {} {}", self.name(), self.launcher.program().display(), args.join(" "));

        let output =
            run_output_with_timeout(self.launcher.program(), &args, self.config.info_timeout).await?;

        if !output.status.success() {
            return Err(DownloadError::from(summarize_stderr(&output.stderr)));
        }

        let info = Self::parse_info(&output.stdout)?;
        debug!("[{}] {} formats for '{}'", self.name(), info.formats.len(), info.title);
        Ok(info)
    }

    async fn download(
        &self,
        url: &str,
        request: &DownloadRequest,
        progress: &dyn ProgressSink,
    ) -> Result<(), DownloadError> {
        let args = self.download_args(url, request);
        debug!("[{}] {} {}", self.name(), self.launcher.program().display(), args.join(" "));

        let mut child = TokioCommand::new(self.launcher.program())
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DownloadError::ToolNotFound(format!(
                    "Failed to start {}: {}",
                    self.launcher.program().display(),
                    e
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::ExecutionError("Failed to capture stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::ExecutionError("Failed to capture stderr".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await.map(|_| buf)
        });

        // Console output is not always UTF-8 (Windows code pages)
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        while reader.read_until(b'\n', &mut buf).await? > 0 {
            {
                let decoded = String::from_utf8_lossy(&buf);
                let line = decoded.trim_end_matches(['\r', '\n']);
                match parse_ytdlp_progress(line) {
                    Some(update) => progress.update(update),
                    None => debug!("[yt-dlp] {}", line),
                }
            }
            buf.clear();
        }

        let status = child.wait().await?;
        progress.finish();
        let stderr_output = stderr_task
            .await
            .map_err(|e| DownloadError::ExecutionError(format!("stderr task failed: {}", e)))??;

        if status.success() {
            return Ok(());
        }

        warn!("[{}] exited with {}", self.name(), status);
        Err(DownloadError::from(summarize_stderr(&stderr_output)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::{DownloadProgress, FormatExpression};
    use std::path::PathBuf;

    fn request(expression: FormatExpression) -> DownloadRequest {
        DownloadRequest {
            expression,
            output_dir: PathBuf::from("downloads"),
            output_template: "%(title)s.%(ext)s".to_string(),
        }
    }

    #[test]
    fn test_info_args_binary() {
        let ytdlp = YtDlp::new(
            Launcher::Binary(PathBuf::from("yt-dlp")),
            ExtractorConfig::default(),
        );
        assert_eq!(
            ytdlp.info_args("https://youtu.be/x"),
            vec![
                "--dump-json",
                "--no-playlist",
                "--no-warnings",
                "--youtube-include-dash-manifest",
                "--",
                "https://youtu.be/x",
            ]
        );
    }

    #[test]
    fn test_download_args_python_with_ffmpeg() {
        let config = ExtractorConfig::default()
            .with_ffmpeg_path(Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")))
            .with_proxy(Some("http://proxy:3128".to_string()));
        let ytdlp = YtDlp::new(Launcher::PythonModule(PathBuf::from("python3")), config);

        let expr = FormatExpression::Merge {
            video_id: "137".to_string(),
            audio_id: "140".to_string(),
        };
        let args = ytdlp.download_args("https://youtu.be/x", &request(expr));
        assert_eq!(
            args,
            vec![
                "-m",
                "yt_dlp",
                "-f",
                "137+140/bestaudio",
                "-P",
                "downloads",
                "-o",
                "%(title)s.%(ext)s",
                "--newline",
                "--no-playlist",
                "--ffmpeg-location",
                "/opt/ffmpeg/bin/ffmpeg",
                "--proxy",
                "http://proxy:3128",
                "--",
                "https://youtu.be/x",
            ]
        );
    }

    #[test]
    fn test_parse_info() {
        let json = br#"{"title": "Clip", "formats": [{"format_id": "18", "vcodec": "avc1", "acodec": "mp4a.40.2", "height": 360}]}"#;
        let info = YtDlp::parse_info(json).unwrap();
        assert_eq!(info.title, "Clip");
        assert_eq!(info.formats[0].format_id, "18");
    }

    #[test]
    fn test_parse_info_rejects_garbage() {
        let err = YtDlp::parse_info(b"not json").unwrap_err();
        assert!(matches!(err, DownloadError::ParseError(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_info_reports_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("yt-dlp");
        std::fs::write(
            &fake,
            "#!/bin/sh\necho 'WARNING: noise' >&2\necho 'ERROR: Unsupported URL: nope' >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let ytdlp = YtDlp::new(Launcher::Binary(fake), ExtractorConfig::default());
        let err = ytdlp.fetch_info("nope").await.unwrap_err();
        match err {
            DownloadError::InvalidUrl(msg) => assert_eq!(msg, "ERROR: Unsupported URL: nope"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        updates: std::sync::Mutex<Vec<DownloadProgress>>,
        finished: std::sync::atomic::AtomicBool,
    }

    impl ProgressSink for RecordingSink {
        fn update(&self, progress: DownloadProgress) {
            self.updates.lock().unwrap().push(progress);
        }

        fn finish(&self) {
            self.finished.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_survives_non_utf8_output() {
        use std::os::unix::fs::PermissionsExt;

        // Latin-1 title as printed by a non-UTF-8 console
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("yt-dlp");
        std::fs::write(
            &fake,
            "#!/bin/sh\nprintf '[download] Destination: Caf\\351.mp4\\n'\nprintf '[download] 100%% of 1.00MiB\\n'\nexit 0\n",
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let ytdlp = YtDlp::new(Launcher::Binary(fake), ExtractorConfig::default());
        let expr = FormatExpression::WithFallback {
            video_id: "18".to_string(),
        };
        let sink = RecordingSink::default();

        let result = ytdlp.download("https://youtu.be/x", &request(expr), &sink).await;
        assert!(result.is_ok(), "{:?}", result);

        let updates = sink.updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].status, "Starting Caf\u{FFFD}.mp4");
        assert_eq!(updates[1].percent, 100.0);
        assert!(sink.finished.load(std::sync::atomic::Ordering::SeqCst));
    }
}
