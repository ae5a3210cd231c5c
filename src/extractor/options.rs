//! Turning a user's download request into extraction-tool options
//!
//! [`build_options`] is pure: the same request and config always yield the
//! same [`ExtractionOptions`]. The serialized form of the options uses the
//! extraction tool's own option names, and [`ExtractionOptions::to_args`]
//! renders the equivalent command line.

use crate::utils::config::{AppConfig, DefaultPreferences};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// File name pattern inside each mode folder (yt-dlp output template syntax)
pub const OUTPUT_FILENAME_TEMPLATE: &str = "[%(uploader)s] %(title)s [%(id)s].%(ext)s";

/// One machine-readable progress line per update on stdout
pub const PROGRESS_TEMPLATE: &str = concat!(
    "download:",
    "[mediagrab] %(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s"
);

/// What the user wants out of a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    #[default]
    Video,
    Audio,
    Cover,
    Metadata,
}

impl DownloadMode {
    pub const ALL: [DownloadMode; 4] = [
        DownloadMode::Video,
        DownloadMode::Audio,
        DownloadMode::Cover,
        DownloadMode::Metadata,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadMode::Video => "video",
            DownloadMode::Audio => "audio",
            DownloadMode::Cover => "cover",
            DownloadMode::Metadata => "metadata",
        }
    }

    /// Subdirectory of the output root: the mode name, capitalized
    pub fn folder_name(&self) -> &'static str {
        match self {
            DownloadMode::Video => "Video",
            DownloadMode::Audio => "Audio",
            DownloadMode::Cover => "Cover",
            DownloadMode::Metadata => "Metadata",
        }
    }
}

impl fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

impl FromStr for DownloadMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DownloadMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| format!("unknown download mode '{}'", s))
    }
}

/// Video quality tiers
///
/// Parsing is lenient: anything unrecognized is treated as [`VideoQuality::Best`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum VideoQuality {
    #[default]
    Best,
    Uhd2160,
    Fhd1080,
    Hd720,
}

impl VideoQuality {
    pub const ALL: [VideoQuality; 4] = [
        VideoQuality::Best,
        VideoQuality::Uhd2160,
        VideoQuality::Fhd1080,
        VideoQuality::Hd720,
    ];

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "4k" | "2160" | "2160p" => VideoQuality::Uhd2160,
            "1080" | "1080p" => VideoQuality::Fhd1080,
            "720" | "720p" => VideoQuality::Hd720,
            _ => VideoQuality::Best,
        }
    }

    /// Value stored in the config file
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoQuality::Best => "best",
            VideoQuality::Uhd2160 => "4k",
            VideoQuality::Fhd1080 => "1080",
            VideoQuality::Hd720 => "720",
        }
    }

    pub fn max_height(&self) -> Option<u32> {
        match self {
            VideoQuality::Best => None,
            VideoQuality::Uhd2160 => Some(2160),
            VideoQuality::Fhd1080 => Some(1080),
            VideoQuality::Hd720 => Some(720),
        }
    }

    /// Best video stream within the limit plus best audio, else the best
    /// combined stream within the limit
    pub fn format_selector(&self) -> String {
        match self.max_height() {
            None => "bestvideo+bestaudio/best".to_string(),
            Some(h) => format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]"),
        }
    }
}

impl From<String> for VideoQuality {
    fn from(value: String) -> Self {
        VideoQuality::parse(&value)
    }
}

impl From<VideoQuality> for String {
    fn from(value: VideoQuality) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VideoQuality::Best => "Best Available",
            VideoQuality::Uhd2160 => "4K (2160p)",
            VideoQuality::Fhd1080 => "1080p",
            VideoQuality::Hd720 => "720p",
        };
        f.write_str(label)
    }
}

/// A single download as requested from the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    pub mode: DownloadMode,
    pub video_quality: VideoQuality,
    /// Merge container for video mode
    pub video_format: String,
    /// Target codec for audio mode
    pub audio_format: String,
    /// Target bitrate in kbps for audio mode
    pub audio_quality: String,
    /// Convert the cover to this image format (cover mode only)
    pub cover_format: Option<String>,
    pub embed_cover: bool,
    pub embed_meta: bool,
    pub live_mode: bool,
}

impl DownloadRequest {
    /// Request pre-filled from the built-in preferences
    pub fn new(url: impl Into<String>, mode: DownloadMode) -> Self {
        Self::from_preferences(url, mode, &DefaultPreferences::default())
    }

    /// Request pre-filled from the user's saved preferences
    pub fn from_preferences(
        url: impl Into<String>,
        mode: DownloadMode,
        prefs: &DefaultPreferences,
    ) -> Self {
        let cover_format = Some(prefs.cover_format.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string);

        Self {
            url: url.into(),
            mode,
            video_quality: VideoQuality::parse(&prefs.video_resolution),
            video_format: prefs.video_format.clone(),
            audio_format: prefs.audio_format.clone(),
            audio_quality: prefs.audio_bitrate.clone(),
            cover_format,
            embed_cover: prefs.embed_thumbnail,
            embed_meta: prefs.embed_metadata,
            live_mode: false,
        }
    }
}

/// When a thumbnail conversion runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessingStage {
    #[serde(rename = "before_dl")]
    BeforeDownload,
}

/// A post-processing step, executed in list order after retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "key")]
pub enum PostProcessor {
    #[serde(rename = "FFmpegExtractAudio")]
    ExtractAudio {
        #[serde(rename = "preferredcodec")]
        codec: String,
        #[serde(rename = "preferredquality")]
        quality: String,
    },
    #[serde(rename = "EmbedThumbnail")]
    EmbedThumbnail,
    #[serde(rename = "FFmpegMetadata")]
    EmbedMetadata,
    #[serde(rename = "FFmpegThumbnailsConvertor")]
    ConvertThumbnails {
        format: String,
        when: ProcessingStage,
    },
}

/// Everything the extraction tool needs for one download
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ExtractionOptions {
    /// Mode folder the template writes into
    #[serde(skip)]
    pub output_dir: PathBuf,
    #[serde(rename = "outtmpl")]
    pub output_template: String,
    pub format: Option<String>,
    pub merge_output_format: Option<String>,
    #[serde(rename = "writethumbnail")]
    pub write_thumbnail: bool,
    #[serde(rename = "embedthumbnail")]
    pub embed_thumbnail: bool,
    #[serde(rename = "addmetadata")]
    pub add_metadata: bool,
    pub skip_download: bool,
    #[serde(rename = "writeinfojson")]
    pub write_info_json: bool,
    #[serde(rename = "postprocessors")]
    pub post_processors: Vec<PostProcessor>,
    pub retries: u32,
    pub fragment_retries: u32,
    pub user_agent: String,
    #[serde(rename = "noplaylist")]
    pub no_playlist: bool,
    pub live_from_start: bool,
    #[serde(rename = "ffmpeg_location")]
    pub encoder_location: PathBuf,
}

/// Build the extraction options for `request` under `config`
pub fn build_options(request: &DownloadRequest, config: &AppConfig) -> ExtractionOptions {
    let output_dir = config.output_root().join(request.mode.folder_name());
    // `%` in the directory is literal; only the file name part is a template
    let escaped_dir = output_dir.to_string_lossy().replace('%', "%%");
    let output_template = PathBuf::from(escaped_dir)
        .join(OUTPUT_FILENAME_TEMPLATE)
        .to_string_lossy()
        .into_owned();
    let advanced = &config.advanced;

    let mut options = ExtractionOptions {
        output_dir,
        output_template,
        retries: advanced.retries,
        fragment_retries: advanced.fragment_retries,
        user_agent: advanced.user_agent.clone(),
        no_playlist: true,
        encoder_location: config.system_settings.ffmpeg_path.clone(),
        ..Default::default()
    };

    match request.mode {
        DownloadMode::Video => {
            options.format = Some(request.video_quality.format_selector());
            options.merge_output_format = Some(request.video_format.clone());
            if request.embed_cover {
                options.write_thumbnail = true;
                options.embed_thumbnail = true;
            }
            options.add_metadata = request.embed_meta;
        }
        DownloadMode::Audio => {
            options.format = Some("bestaudio/best".to_string());
            // Extraction must run before anything is embedded into its output
            options.post_processors.push(PostProcessor::ExtractAudio {
                codec: request.audio_format.clone(),
                quality: request.audio_quality.clone(),
            });
            if request.embed_cover {
                options.write_thumbnail = true;
                options.post_processors.push(PostProcessor::EmbedThumbnail);
            }
            if request.embed_meta {
                options.post_processors.push(PostProcessor::EmbedMetadata);
            }
        }
        DownloadMode::Cover => {
            options.skip_download = true;
            options.write_thumbnail = true;
            if let Some(format) = &request.cover_format {
                options.post_processors.push(PostProcessor::ConvertThumbnails {
                    format: format.clone(),
                    when: ProcessingStage::BeforeDownload,
                });
            }
        }
        DownloadMode::Metadata => {
            options.skip_download = true;
            options.write_info_json = true;
        }
    }

    if request.live_mode {
        options.live_from_start = true;
        // Embedding into a file that is still growing is unreliable
        if request.mode == DownloadMode::Video {
            options.write_thumbnail = false;
            options.embed_thumbnail = false;
        }
    }

    options
}

impl ExtractionOptions {
    /// Render these options as yt-dlp command-line arguments (without the URL)
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--newline".into(),
            "--progress-template".into(),
            PROGRESS_TEMPLATE.into(),
            "-o".into(),
            self.output_template.clone(),
            "--retries".into(),
            self.retries.to_string(),
            "--fragment-retries".into(),
            self.fragment_retries.to_string(),
            "--user-agent".into(),
            self.user_agent.clone(),
        ];

        if !self.encoder_location.as_os_str().is_empty() {
            args.push("--ffmpeg-location".into());
            args.push(self.encoder_location.to_string_lossy().into_owned());
        }
        if self.no_playlist {
            args.push("--no-playlist".into());
        }
        if let Some(format) = &self.format {
            args.push("-f".into());
            args.push(format.clone());
        }
        if let Some(container) = &self.merge_output_format {
            args.push("--merge-output-format".into());
            args.push(container.clone());
        }

        let flags = [
            (self.skip_download, "--skip-download"),
            (self.write_thumbnail, "--write-thumbnail"),
            (self.embed_thumbnail, "--embed-thumbnail"),
            (self.add_metadata, "--embed-metadata"),
            (self.write_info_json, "--write-info-json"),
            (self.live_from_start, "--live-from-start"),
        ];
        args.extend(
            flags
                .iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, flag)| flag.to_string()),
        );

        for step in &self.post_processors {
            match step {
                PostProcessor::ExtractAudio { codec, quality } => {
                    args.extend([
                        "--extract-audio".into(),
                        "--audio-format".into(),
                        codec.clone(),
                        "--audio-quality".into(),
                        quality.clone(),
                    ]);
                }
                PostProcessor::EmbedThumbnail if !self.embed_thumbnail => {
                    args.push("--embed-thumbnail".into());
                }
                PostProcessor::EmbedMetadata if !self.add_metadata => {
                    args.push("--embed-metadata".into());
                }
                PostProcessor::ConvertThumbnails { format, .. } => {
                    args.push("--convert-thumbnails".into());
                    args.push(format.clone());
                }
                _ => {}
            }
        }

        args
    }
}
