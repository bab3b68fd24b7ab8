// Download session - drives one URL from metadata to finished file
//
// FetchInfo -> ChooseQuality -> ResolveMergeStrategy -> Download -> Done
// Abort is reachable from any interactive state.

use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::info;

use super::errors::DownloadError;
use super::format_selector::{FormatExpression, FormatSelector};
use super::models::{Format, SessionOptions, VideoInfo};
use super::prompt::{self, MergeFallback};
use super::traits::{DownloadRequest, ExtractionService, NoProgress, ProgressSink};

const FFMPEG_DOWNLOAD_URL: &str = "https://ffmpeg.org/download.html";

/// Fatal session failures, tagged with the stage that failed
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Error fetching video info: {0}")]
    FetchInfo(#[source] DownloadError),

    #[error("Download failed: {0}")]
    Download(#[source] DownloadError),

    /// Prompt I/O failed or input ended
    #[error(transparent)]
    Interaction(#[from] DownloadError),
}

impl SessionError {
    pub fn cause(&self) -> &DownloadError {
        match self {
            Self::FetchInfo(e) | Self::Download(e) | Self::Interaction(e) => e,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Nothing to choose from; a normal, successful exit
    NoFormatChosen,
    /// User chose to install ffmpeg first
    MuxerMissing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed { title: String, expression: FormatExpression },
    Aborted(AbortReason),
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Completed { .. } | Self::Aborted(AbortReason::NoFormatChosen) => 0,
            Self::Aborted(AbortReason::MuxerMissing) => 1,
        }
    }
}

enum SessionState {
    FetchInfo,
    ChooseQuality(VideoInfo),
    ResolveMergeStrategy {
        info: VideoInfo,
        video_formats: Vec<Format>,
        chosen: Format,
    },
    Download {
        info: VideoInfo,
        chosen: Format,
        expression: FormatExpression,
    },
    Done(Outcome),
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            Self::FetchInfo => "fetch_info",
            Self::ChooseQuality(_) => "choose_quality",
            Self::ResolveMergeStrategy { .. } => "resolve_merge_strategy",
            Self::Download { .. } => "download",
            Self::Done(Outcome::Completed { .. }) => "done",
            Self::Done(Outcome::Aborted(_)) => "abort",
        }
    }
}

pub struct Session<'a> {
    service: &'a dyn ExtractionService,
    options: SessionOptions,
    muxer_probe: Box<dyn Fn() -> bool + 'a>,
    progress: Box<dyn ProgressSink + 'a>,
}

impl<'a> Session<'a> {
    pub fn new(service: &'a dyn ExtractionService, options: SessionOptions) -> Self {
        Self {
            service,
            options,
            muxer_probe: Box::new(|| false),
            progress: Box::new(NoProgress),
        }
    }

    /// How to tell whether ffmpeg is installed
    pub fn with_muxer_probe(mut self, probe: impl Fn() -> bool + 'a) -> Self {
        self.muxer_probe = Box::new(probe);
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'a) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub async fn run<R: BufRead, W: Write>(
        &self,
        url: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<Outcome, SessionError> {
        let mut state = SessionState::FetchInfo;

        loop {
            info!(state = state.name(), "session state");
            state = match state {
                SessionState::FetchInfo => {
                    let info = self
                        .service
                        .fetch_info(url)
                        .await
                        .map_err(SessionError::FetchInfo)?;
                    SessionState::ChooseQuality(info)
                }

                SessionState::ChooseQuality(info) => {
                    let video_formats = FormatSelector::video_formats(&info.formats);
                    match prompt::choose_quality(&video_formats, false, input, output)? {
                        None => {
                            writeln!(output, "No format chosen, aborting.").map_err(DownloadError::from)?;
                            SessionState::Done(Outcome::Aborted(AbortReason::NoFormatChosen))
                        }
                        Some(chosen) if self.options.check_muxer => SessionState::ResolveMergeStrategy {
                            info,
                            video_formats,
                            chosen,
                        },
                        Some(chosen) => {
                            let expression =
                                FormatSelector::build_expression(&chosen, FormatSelector::best_audio(&info.formats));
                            SessionState::Download { info, chosen, expression }
                        }
                    }
                }

                SessionState::ResolveMergeStrategy {
                    info,
                    video_formats,
                    chosen,
                } => {
                    let best_audio = FormatSelector::best_audio(&info.formats);
                    if FormatSelector::needs_merge(&chosen, best_audio) && !(self.muxer_probe)() {
                        match self.resolve_without_muxer(&video_formats, chosen, input, output)? {
                            Some((chosen, expression)) => SessionState::Download { info, chosen, expression },
                            None => SessionState::Done(Outcome::Aborted(AbortReason::MuxerMissing)),
                        }
                    } else {
                        let expression = FormatSelector::build_expression(&chosen, best_audio);
                        SessionState::Download { info, chosen, expression }
                    }
                }

                SessionState::Download {
                    info,
                    chosen,
                    expression,
                } => {
                    self.download(url, &info, &chosen, expression, output).await?
                }

                SessionState::Done(outcome) => return Ok(outcome),
            };
        }
    }

    /// Fallback menu when a merge is needed but ffmpeg is missing.
    /// `None` means the user aborted.
    fn resolve_without_muxer<R: BufRead, W: Write>(
        &self,
        video_formats: &[Format],
        chosen: Format,
        input: &mut R,
        output: &mut W,
    ) -> Result<Option<(Format, FormatExpression)>, DownloadError> {
        prompt::print_merge_fallback_menu(output)?;

        loop {
            match prompt::ask_merge_fallback(input, output)? {
                MergeFallback::VideoOnly => {
                    let expression = FormatExpression::VideoOnly {
                        video_id: chosen.format_id.clone(),
                    };
                    return Ok(Some((chosen, expression)));
                }
                MergeFallback::Progressive => {
                    match prompt::choose_quality(video_formats, true, input, output)? {
                        Some(progressive) => {
                            let expression = FormatExpression::WithFallback {
                                video_id: progressive.format_id.clone(),
                            };
                            return Ok(Some((progressive, expression)));
                        }
                        None => writeln!(
                            output,
                            "No progressive formats available. Please choose another option."
                        )?,
                    }
                }
                MergeFallback::Abort => {
                    writeln!(
                        output,
                        "Please install ffmpeg and re-run. See {}",
                        FFMPEG_DOWNLOAD_URL
                    )?;
                    return Ok(None);
                }
            }
        }
    }

    async fn download<W: Write>(
        &self,
        url: &str,
        info: &VideoInfo,
        chosen: &Format,
        expression: FormatExpression,
        output: &mut W,
    ) -> Result<SessionState, SessionError> {
        writeln!(
            output,
            "\nDownloading: {} ({})",
            info.title,
            chosen.resolution_or_unknown()
        )
        .map_err(DownloadError::from)?;
        output.flush().map_err(DownloadError::from)?;

        let request = DownloadRequest {
            expression: expression.clone(),
            output_dir: self.options.output_dir.clone(),
            output_template: self.options.output_template.clone(),
        };
        info!(format = %request.expression, "starting download");

        self.service
            .download(url, &request, self.progress.as_ref())
            .await
            .map_err(SessionError::Download)?;

        writeln!(output, "\nDownload complete: {}", info.title).map_err(DownloadError::from)?;
        Ok(SessionState::Done(Outcome::Completed {
            title: info.title.clone(),
            expression,
        }))
    }
}
