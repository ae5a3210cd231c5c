//! MediaGrab library
//!
//! A desktop front end for yt-dlp and FFmpeg: settings persistence, URL
//! sniffing, option building and background download dispatch.

pub mod backend;
pub mod downloader;
pub mod extractor;
pub mod gui;
pub mod utils;

// Re-export main types for easier use
pub use backend::{BackendEvent, UiBridge};
pub use downloader::{Dispatcher, DownloadHandle, TaskState};
pub use extractor::{
    build_options, classify, DownloadMode, DownloadRequest, ExtractionOptions, MediaExtractor,
    VideoQuality, YtDlpExtractor,
};
pub use gui::{MediaGrabApp, Message, View};
pub use utils::{AppConfig, ConfigStore, MediaGrabError};
