//! Platform-specific utilities for mediagrab
//!
//! This module provides cross-platform abstractions for:
//! - Application directories (config, downloads)
//! - Locating the external `yt-dlp` and `ffmpeg` binaries

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the encoder binary we delegate transcoding and embedding to.
pub const ENCODER_BINARY: &str = "ffmpeg";

/// Name of the extraction tool we delegate all site logic to.
pub const EXTRACTOR_BINARY: &str = "yt-dlp";

/// Returns the configuration directory
/// - macOS: ~/Library/Application Support/mediagrab
/// - Windows: %APPDATA%\mediagrab
/// - Linux: ~/.config/mediagrab
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mediagrab")
    }

    #[cfg(not(target_os = "linux"))]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mediagrab")
    }
}

/// Default location of the JSON settings file
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Returns the default download directory
/// - All platforms: ~/Downloads/mediagrab
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("mediagrab")
}

/// Locate the encoder binary (bundled copy first, then PATH, then common paths)
pub fn find_ffmpeg() -> Option<PathBuf> {
    find_binary(ENCODER_BINARY)
}

/// Locate the extraction tool (bundled copy first, then PATH, then common paths)
pub fn find_ytdlp() -> Option<PathBuf> {
    find_binary(EXTRACTOR_BINARY)
}

fn find_binary(name: &str) -> Option<PathBuf> {
    if let Some(bundled) = find_bundled(name) {
        info!("Using bundled {}: {:?}", name, bundled);
        return Some(bundled);
    }

    if let Ok(path) = which::which(name) {
        info!("Using system {}: {:?}", name, path);
        return Some(path);
    }

    if let Some(common) = find_in_common_paths(name) {
        info!("Using {} from common path: {:?}", name, common);
        return Some(common);
    }

    warn!("{} not found anywhere", name);
    None
}

/// A copy shipped next to our executable, or inside a macOS bundle's Resources/bin
fn find_bundled(name: &str) -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;
    let file_name = format!("{}{}", name, exe_extension());

    let adjacent = exe_dir.join(&file_name);
    debug!("Checking bundled path: {:?}", adjacent);
    if is_executable(&adjacent) {
        return Some(adjacent);
    }

    // Structure: App.app/Contents/MacOS/mediagrab
    // Resource:  App.app/Contents/Resources/bin/<name>
    if exe_dir.ends_with("MacOS") {
        let bundle_path = exe_dir.parent()?.join("Resources").join("bin").join(&file_name);
        if is_executable(&bundle_path) {
            return Some(bundle_path);
        }
    }

    None
}

fn find_in_common_paths(name: &str) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"]
        .iter()
        .map(|dir| Path::new(dir).join(name))
        .collect();

    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join(name));
    }

    candidates.into_iter().find(|path| is_executable(path))
}

/// Check if a path points to an executable file
pub fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// Platform-specific executable extension
pub fn exe_extension() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        ".exe"
    }
    #[cfg(not(target_os = "windows"))]
    {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_ends_with_json() {
        let path = default_config_path();
        assert!(path.ends_with("config.json"));
        assert!(path
            .parent()
            .map(|p| p.ends_with("mediagrab"))
            .unwrap_or(false));
    }

    #[test]
    fn test_download_dir_named_after_app() {
        let dir = default_download_dir();
        assert_eq!(dir.file_name().and_then(|n| n.to_str()), Some("mediagrab"));
    }

    #[test]
    fn test_missing_file_is_not_executable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_executable(&dir.path().join("nope")));
        // Directories never count, even with the x bit set
        assert!(!is_executable(dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_is_executable_checks_mode_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("tool");
        std::fs::write(&bin, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!is_executable(&bin));

        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(is_executable(&bin));
    }
}
