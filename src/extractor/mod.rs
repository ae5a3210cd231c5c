pub mod classifier;
pub mod options;
pub mod traits;
pub mod ytdlp;

pub use classifier::{classify, Platform, UrlAnalysis};
pub use options::{
    build_options, DownloadMode, DownloadRequest, ExtractionOptions, PostProcessor, VideoQuality,
};
pub use traits::{MediaExtractor, ProgressHook, TransferProgress};
pub use ytdlp::YtDlpExtractor;
