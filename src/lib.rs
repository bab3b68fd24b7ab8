pub mod cli;
pub mod downloader;
pub mod ytdlp;

use colored::Colorize;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{debug, error, Level};

use cli::Cli;
use downloader::diagnostics::diagnose_error;
use downloader::extractors::LauncherResolver;
use downloader::progress::TerminalProgress;
use downloader::tools::{ToolManager, ToolType};
use downloader::{Outcome, Session, SessionError};
use ytdlp::YtDlp;

/// Run one download session for the parsed command line
pub async fn run(cli: Cli) -> ExitCode {
    let url = match cli.target_url() {
        Ok(url) => url,
        Err(e) => {
            debug!("Rejected arguments: {}", e);
            println!("{}", Cli::usage_text());
            return ExitCode::from(1);
        }
    };

    let tools = ToolManager::new();
    let config = cli.extractor_config();

    let launcher = match LauncherResolver::new(&tools).resolve(&config) {
        Ok(launcher) => launcher,
        Err(e) => {
            error!("{}", e);
            println!("{} {}", "✗".red().bold(), e);
            return ExitCode::from(1);
        }
    };

    let ffmpeg_path = config.ffmpeg_path.clone();
    let muxer_probe = || {
        if tracing::enabled!(Level::DEBUG) {
            let ffmpeg = tools.get_tool_info(ToolType::Ffmpeg, ffmpeg_path.as_deref());
            debug!("ffmpeg: path={:?} version={:?}", ffmpeg.path, ffmpeg.version);
        }
        tools.is_available(ToolType::Ffmpeg, ffmpeg_path.as_deref())
    };

    let service = YtDlp::new(launcher, config);
    let session = Session::new(&service, cli.session_options())
        .with_muxer_probe(muxer_probe)
        .with_progress(TerminalProgress::new());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    match session.run(&url, &mut input, &mut output).await {
        Ok(outcome) => {
            if let Outcome::Completed { expression, .. } = &outcome {
                debug!("Finished with format {}", expression);
            }
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            report_failure(&e, &mut output);
            ExitCode::from(1)
        }
    }
}

fn report_failure<W: Write>(e: &SessionError, output: &mut W) {
    error!("{}", e);
    let _ = writeln!(output, "{}", e.to_string().red());

    if let Some(reason) = diagnose_error(&e.cause().detail()) {
        if let Some(hint) = reason.hint() {
            let _ = writeln!(output, "{} {}: {}", "ℹ".blue().bold(), reason.description(), hint);
        }
    }
}
