//! yt-dlp process wrapper
//!
//! The download runs as a child process. Progress comes from the
//! `--progress-template` line on stdout; warnings and errors are read from
//! stderr.

use crate::extractor::options::ExtractionOptions;
use crate::extractor::traits::{MediaExtractor, ProgressHook, TransferProgress};
use crate::utils::error::{MediaGrabError, Result};
use crate::utils::platform;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info};

/// Prefix of our own progress template lines
const PROGRESS_PREFIX: &str = "[mediagrab]";

/// Log prefixes of yt-dlp post-processors; seeing one means the raw transfer is over
const POSTPROCESSOR_PREFIXES: [&str; 7] = [
    "[Merger]",
    "[ExtractAudio]",
    "[EmbedThumbnail]",
    "[Metadata]",
    "[ThumbnailsConvertor]",
    "[FixupM3u8]",
    "[VideoRemuxer]",
];

/// Media extractor backed by the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    ytdlp_path: PathBuf,
}

impl YtDlpExtractor {
    /// Locate yt-dlp on this host
    pub fn new() -> Result<Self> {
        match platform::find_ytdlp() {
            Some(path) => {
                info!("Found yt-dlp at: {}", path.display());
                Ok(Self { ytdlp_path: path })
            }
            None => {
                error!("yt-dlp not found anywhere!");
                Err(MediaGrabError::YtDlpNotFound)
            }
        }
    }

    /// Use a specific yt-dlp binary
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            ytdlp_path: path.into(),
        }
    }

    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    fn id(&self) -> &'static str {
        "yt-dlp"
    }

    async fn download(
        &self,
        url: &str,
        options: &ExtractionOptions,
        hook: &mut dyn ProgressHook,
    ) -> Result<()> {
        let args = options.to_args();
        debug!("Running {} {:?} -- {}", self.ytdlp_path.display(), args, url);

        let mut child = AsyncCommand::new(&self.ytdlp_path)
            .args(&args)
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaGrabError::OperationFailed("yt-dlp stdout not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaGrabError::OperationFailed("yt-dlp stderr not captured".into()))?;

        let mut out_reader = BufReader::new(stdout);
        let mut err_reader = BufReader::new(stderr);
        let (mut out_buf, mut err_buf) = (Vec::new(), Vec::new());
        let (mut out_done, mut err_done) = (false, false);
        let mut last_error: Option<String> = None;

        // Bytes, not lines: output is not always UTF-8 and both pipes must be
        // drained to EOF or the child can block on a full pipe
        while !(out_done && err_done) {
            tokio::select! {
                read = out_reader.read_until(b'\n', &mut out_buf), if !out_done => {
                    out_done = consume_line(read, &mut out_buf, hook, &mut last_error);
                }
                read = err_reader.read_until(b'\n', &mut err_buf), if !err_done => {
                    err_done = consume_line(read, &mut err_buf, hook, &mut last_error);
                }
            }
        }

        let status = child.wait().await?;
        if status.success() {
            debug!("yt-dlp finished successfully for {}", url);
            Ok(())
        } else {
            let message =
                last_error.unwrap_or_else(|| format!("yt-dlp exited with {}", status));
            Err(MediaGrabError::ExtractionError(message))
        }
    }

    async fn version(&self) -> Option<String> {
        let output = AsyncCommand::new(&self.ytdlp_path)
            .arg("--version")
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!version.is_empty()).then_some(version)
    }
}

/// Handle one `read_until` result; returns true once the stream is finished
fn consume_line(
    read: std::io::Result<usize>,
    buf: &mut Vec<u8>,
    hook: &mut dyn ProgressHook,
    last_error: &mut Option<String>,
) -> bool {
    match read {
        Ok(0) => true,
        Ok(_) => {
            let line = String::from_utf8_lossy(buf);
            dispatch_line(line.trim_end_matches(['\r', '\n']), hook, last_error);
            buf.clear();
            false
        }
        Err(e) => {
            debug!("yt-dlp output stream closed: {}", e);
            true
        }
    }
}

fn dispatch_line(line: &str, hook: &mut dyn ProgressHook, last_error: &mut Option<String>) {
    match parse_output_line(line) {
        OutputLine::Progress(progress) => {
            let done = progress.percent >= 100.0;
            hook.on_progress(progress);
            if done {
                hook.on_finished();
            }
        }
        OutputLine::PostProcessing => hook.on_finished(),
        OutputLine::Warning(message) => {
            debug!("yt-dlp warning: {}", message);
            hook.on_warning(&message);
        }
        OutputLine::Error(message) => {
            hook.on_error(&message);
            *last_error = Some(message);
        }
        OutputLine::Other => debug!("yt-dlp: {}", line),
    }
}

/// A classified line of yt-dlp output
#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    Progress(TransferProgress),
    PostProcessing,
    Warning(String),
    Error(String),
    Other,
}

/// Classify one line of yt-dlp output (stdout or stderr)
pub fn parse_output_line(line: &str) -> OutputLine {
    let line = strip_ansi(line);
    let line = line.trim();

    if let Some(rest) = line.strip_prefix(PROGRESS_PREFIX) {
        return parse_progress(rest)
            .map(OutputLine::Progress)
            .unwrap_or(OutputLine::Other);
    }
    if let Some(rest) = line.strip_prefix("WARNING:") {
        return OutputLine::Warning(rest.trim().to_string());
    }
    if let Some(rest) = line.strip_prefix("ERROR:") {
        return OutputLine::Error(rest.trim().to_string());
    }
    if POSTPROCESSOR_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return OutputLine::PostProcessing;
    }
    OutputLine::Other
}

/// Parse `" 42.5%|1.20MiB/s|00:42"`
fn parse_progress(rest: &str) -> Option<TransferProgress> {
    let mut fields = rest.split('|').map(str::trim);
    let percent_str = fields.next()?;
    let speed = fields.next()?;
    let eta = fields.next()?;

    // Live streams report "N/A" or "Unknown %"
    let percent = percent_str
        .trim_end_matches('%')
        .trim()
        .parse::<f32>()
        .map(|p| p.clamp(0.0, 100.0))
        .unwrap_or(0.0);

    Some(TransferProgress {
        percent,
        speed: or_na(speed),
        eta: or_na(eta),
    })
}

fn or_na(value: &str) -> String {
    if value.is_empty() || value.eq_ignore_ascii_case("unknown") || value == "NA" {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}

/// Remove terminal color sequences (ESC [ ... letter)
fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
