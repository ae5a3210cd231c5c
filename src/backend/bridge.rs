//! Operations the GUI calls into
//!
//! The GUI thread never awaits backend work. Downloads and tool lookups run
//! on the tokio runtime and report back through the event channel, which the
//! GUI drains on every tick.

use crate::backend::messages::{
    event_channel, BackendEvent, EventReceiver, EventSender, LogLevel, TaskId,
};
use crate::downloader::dispatcher::Dispatcher;
use crate::extractor::classifier::{classify, UrlAnalysis};
use crate::extractor::options::{DownloadMode, DownloadRequest};
use crate::extractor::traits::MediaExtractor;
use crate::extractor::ytdlp::YtDlpExtractor;
use crate::utils::config::{AppConfig, ConfigStore};
use crate::utils::error::Result;
use crate::utils::platform;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

pub struct UiBridge {
    runtime: Handle,
    config: Arc<ConfigStore>,
    dispatcher: Dispatcher,
    events: EventReceiver,
}

impl UiBridge {
    pub fn new(
        runtime: Handle,
        config: Arc<ConfigStore>,
        extractor: Arc<dyn MediaExtractor>,
    ) -> Self {
        let (sender, events) = event_channel();
        let dispatcher = Dispatcher::new(runtime.clone(), Arc::clone(&config), extractor, sender);
        Self {
            runtime,
            config,
            dispatcher,
            events,
        }
    }

    /// Bridge backed by the yt-dlp found on this host
    ///
    /// A missing yt-dlp is not fatal here: the bare binary name is used and
    /// the failure surfaces when a download or dependency check runs.
    pub fn with_ytdlp(runtime: Handle, config: Arc<ConfigStore>) -> Self {
        let extractor = YtDlpExtractor::new().unwrap_or_else(|e| {
            warn!("{}; falling back to '{}' on PATH", e, platform::EXTRACTOR_BINARY);
            YtDlpExtractor::with_path(platform::EXTRACTOR_BINARY)
        });
        Self::new(runtime, config, Arc::new(extractor))
    }

    pub fn events(&self) -> &EventSender {
        self.dispatcher.events()
    }

    /// Current settings; runs the dependency check when it is enabled
    pub fn init_app(&self) -> AppConfig {
        let config = self.config.snapshot();
        if config.advanced.check_dependencies_on_startup {
            self.check_dependencies();
        }
        config
    }

    /// Validate, persist and publish new settings
    pub fn update_config(&self, config: AppConfig) -> Result<()> {
        match self.config.update(config) {
            Ok(()) => {
                self.events().log(LogLevel::Info, "Settings saved");
                Ok(())
            }
            Err(e) => {
                self.events()
                    .log(LogLevel::Error, format!("Failed to save settings: {}", e));
                Err(e)
            }
        }
    }

    /// Folder picker; `None` when the user cancels
    pub fn select_directory(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select download folder")
            .pick_folder()
    }

    /// Encoder binary picker; `None` when the user cancels
    pub fn select_encoder_file(&self) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().set_title("Select FFmpeg executable");
        if cfg!(windows) {
            dialog = dialog.add_filter("Executable", &["exe"]);
        }
        dialog.add_filter("All Files", &["*"]).pick_file()
    }

    pub fn analyze_url(&self, url: &str) -> UrlAnalysis {
        classify(url.trim())
    }

    /// Start a download without waiting for it; the outcome arrives as events
    ///
    /// Returns the new task id, or `None` when the start was refused (already
    /// reported as an error event).
    pub fn start_download_task(&self, request: DownloadRequest) -> Option<TaskId> {
        match self.dispatcher.start_task(request) {
            Ok(id) => Some(id),
            Err(e) => {
                debug!("Download not started: {}", e);
                None
            }
        }
    }

    /// Next pending backend event, if any
    pub fn try_receive_event(&mut self) -> Option<BackendEvent> {
        self.events.try_recv().ok()
    }

    /// Report yt-dlp and encoder availability as log events
    pub fn check_dependencies(&self) {
        let extractor = Arc::clone(self.dispatcher.extractor());
        let events = self.events().clone();
        let config = self.config.snapshot();
        let has_encoder_path = config.has_encoder_path();
        let encoder = config.system_settings.ffmpeg_path;

        self.runtime.spawn(async move {
            match extractor.version().await {
                Some(version) => events.log(
                    LogLevel::Info,
                    format!("{} {} detected", extractor.id(), version),
                ),
                None => events.log(
                    LogLevel::Error,
                    format!(
                        "{} is not available. Install it and make sure it is on PATH",
                        extractor.id()
                    ),
                ),
            }

            if !has_encoder_path {
                events.log(
                    LogLevel::Warn,
                    "FFmpeg path is not set. Set it in Settings before downloading",
                );
            } else if platform::is_executable(&encoder) {
                events.log(
                    LogLevel::Info,
                    format!("FFmpeg found at {}", encoder.display()),
                );
            } else {
                events.log(
                    LogLevel::Warn,
                    format!("FFmpeg not found at '{}'", encoder.display()),
                );
            }
        });
    }

    /// Reveal the output folder for `mode`, creating it if needed
    pub fn open_output_folder(&self, mode: DownloadMode) -> Result<()> {
        let folder = self.config.snapshot().output_root().join(mode.folder_name());
        std::fs::create_dir_all(&folder)?;
        if let Err(e) = open::that(&folder) {
            self.events().log(
                LogLevel::Warn,
                format!("Could not open {}: {}", folder.display(), e),
            );
            return Err(e.into());
        }
        Ok(())
    }
}
