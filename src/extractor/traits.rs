use crate::extractor::options::ExtractionOptions;
use crate::utils::error::Result;
use async_trait::async_trait;

/// One progress report from a running transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferProgress {
    /// 0.0 ..= 100.0
    pub percent: f32,
    /// Human-readable speed as reported by the tool, e.g. "1.20MiB/s"
    pub speed: String,
    /// Human-readable time left, e.g. "00:42"
    pub eta: String,
}

/// Callbacks a running extraction reports through
pub trait ProgressHook: Send {
    /// Raw transfer progress
    fn on_progress(&mut self, progress: TransferProgress);

    /// A raw transfer completed; post-processing may follow
    fn on_finished(&mut self);

    fn on_warning(&mut self, message: &str);

    fn on_error(&mut self, message: &str);
}

/// Core trait for the media-extraction backend
///
/// This isolates the dispatcher from how extraction is performed
/// (the yt-dlp process, a test double, ...).
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Returns a unique identifier for this extractor (e.g. "yt-dlp")
    fn id(&self) -> &'static str;

    /// Download `url` with `options`, reporting through `hook`.
    ///
    /// Resolves once the tool is done, including post-processing.
    async fn download(
        &self,
        url: &str,
        options: &ExtractionOptions,
        hook: &mut dyn ProgressHook,
    ) -> Result<()>;

    /// Version string of the underlying tool, if it can be determined
    async fn version(&self) -> Option<String> {
        None
    }
}
