//! Application configuration
//!
//! Settings live in a single human-editable JSON file with three sections.
//! A missing or unreadable file is never an error for the user: it is
//! replaced by the built-in defaults and written back.

use crate::utils::error::{MediaGrabError, Result};
use crate::utils::platform;
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, warn};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/91.0.4472.124 Safari/537.36";

/// Full persisted configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub system_settings: SystemSettings,
    pub default_preferences: DefaultPreferences,
    pub advanced: AdvancedSettings,
}

/// Paths and appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    /// Encoder binary; empty until discovered or chosen by the user
    pub ffmpeg_path: PathBuf,

    /// Root of the per-mode output folders
    pub output_directory: PathBuf,

    pub theme: ThemeChoice,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::new(),
            output_directory: platform::default_download_dir(),
            theme: ThemeChoice::Dark,
        }
    }
}

/// Values used to pre-fill a new download request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultPreferences {
    /// Merge container for video downloads
    pub video_format: String,
    /// Target codec for audio extraction
    pub audio_format: String,
    /// Target bitrate (kbps) for audio extraction
    pub audio_bitrate: String,
    pub embed_thumbnail: bool,
    pub embed_metadata: bool,
    /// Quality tier: best, 4k, 1080 or 720
    pub video_resolution: String,
    /// Image format for cover downloads; empty keeps the original
    #[serde(default)]
    pub cover_format: String,
}

impl Default for DefaultPreferences {
    fn default() -> Self {
        Self {
            video_format: "mp4".to_string(),
            audio_format: "m4a".to_string(),
            audio_bitrate: "192".to_string(),
            embed_thumbnail: true,
            embed_metadata: true,
            video_resolution: "best".to_string(),
            cover_format: String::new(),
        }
    }
}

/// Network tuning handed straight to the extraction tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedSettings {
    pub user_agent: String,
    pub retries: u32,
    pub fragment_retries: u32,
    pub check_dependencies_on_startup: bool,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retries: 10,
            fragment_retries: 10,
            check_dependencies_on_startup: true,
        }
    }
}

/// Window theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

impl ThemeChoice {
    pub const ALL: [ThemeChoice; 2] = [ThemeChoice::Dark, ThemeChoice::Light];
}

impl fmt::Display for ThemeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeChoice::Dark => write!(f, "Dark"),
            ThemeChoice::Light => write!(f, "Light"),
        }
    }
}

impl AppConfig {
    /// Reject updates the rest of the app cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.system_settings.output_directory.as_os_str().is_empty() {
            return Err(MediaGrabError::InvalidConfig(
                "output directory must not be empty".to_string(),
            ));
        }
        if self.advanced.user_agent.trim().is_empty() {
            return Err(MediaGrabError::InvalidConfig(
                "user agent must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Output root as an absolute path (relative values resolve against the cwd)
    pub fn output_root(&self) -> PathBuf {
        let dir = &self.system_settings.output_directory;
        dir.absolutize()
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| dir.clone())
    }

    pub fn has_encoder_path(&self) -> bool {
        !self.system_settings.ffmpeg_path.as_os_str().is_empty()
    }
}

/// Owner of the in-memory configuration and its file
///
/// Readers take a [`snapshot`](ConfigStore::snapshot); only the UI side calls
/// [`update`](ConfigStore::update), which persists and swaps under one write lock.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    current: RwLock<AppConfig>,
}

impl ConfigStore {
    /// Load (or create) the config at `path`, probing the host for ffmpeg
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_finder(path, platform::find_ffmpeg)
    }

    /// Same as [`open`](ConfigStore::open) with an injectable encoder lookup
    pub fn open_with_finder<F>(path: impl Into<PathBuf>, find_encoder: F) -> Result<Self>
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        let path = path.into();
        let (mut config, mut needs_save) = match read_config(&path) {
            Ok(Some(config)) => (config, false),
            Ok(None) => {
                info!("No config at {:?}, creating defaults", path);
                (AppConfig::default(), true)
            }
            Err(MediaGrabError::SerializationError(e)) => {
                warn!("Config at {:?} is corrupt ({}), using defaults", path, e);
                (AppConfig::default(), true)
            }
            Err(e) => return Err(e),
        };

        if !config.has_encoder_path() {
            if let Some(found) = find_encoder() {
                info!("Detected ffmpeg at {:?}", found);
                config.system_settings.ffmpeg_path = found;
                needs_save = true;
            }
        }

        if needs_save {
            write_config(&path, &config)?;
        }

        Ok(Self {
            path,
            current: RwLock::new(config),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Owned copy of the current configuration
    pub fn snapshot(&self) -> AppConfig {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Persist the in-memory configuration as-is
    pub fn save(&self) -> Result<()> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        write_config(&self.path, &guard)
    }

    /// Replace the whole configuration and persist it.
    ///
    /// The in-memory copy only changes once the file write succeeded.
    pub fn update(&self, new_config: AppConfig) -> Result<()> {
        new_config.validate()?;

        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        write_config(&self.path, &new_config)?;
        *guard = new_config;

        debug!("Config updated and saved to {:?}", self.path);
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<Option<AppConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    // Raw bytes so non-UTF-8 garbage counts as a parse failure, not an I/O one
    let content = std::fs::read(path)?;
    let config = serde_json::from_slice(&content)?;
    Ok(Some(config))
}

fn write_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
