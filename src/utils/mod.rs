//! Utility modules for error handling, configuration and host paths

pub mod config;
pub mod error;
pub mod platform;

// Re-export for convenience
pub use config::{
    AdvancedSettings, AppConfig, ConfigStore, DefaultPreferences, SystemSettings, ThemeChoice,
};
pub use error::MediaGrabError;
pub use platform::{default_config_path, find_ffmpeg, find_ytdlp};
