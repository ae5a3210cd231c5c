//! Best-effort URL sniffing for display purposes
//!
//! Nothing here verifies that a URL is actually supported or actually live;
//! the extraction tool is the only authority on that. The live check is a
//! keyword heuristic and will flag e.g. a regular upload whose slug contains
//! "live".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse platform tag shown next to the URL field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Bilibili,
    Twitch,
    #[default]
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Bilibili => "bilibili",
            Platform::Twitch => "twitch",
            Platform::Unknown => "unknown",
        }
    }

    /// Does this platform claim the URL? `lower` is the lowercased URL.
    fn matches(&self, url: &str, lower: &str) -> bool {
        match self {
            Platform::Youtube => lower.contains("youtube") || lower.contains("youtu.be"),
            // Bilibili video ids ("BV1xx...") are case-sensitive
            Platform::Bilibili => lower.contains("bilibili.com") || url.contains("BV"),
            Platform::Twitch => lower.contains("twitch.tv"),
            Platform::Unknown => false,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checked in order; the first match wins.
const KNOWN_PLATFORMS: [Platform; 3] = [Platform::Youtube, Platform::Bilibili, Platform::Twitch];

/// Result of [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UrlAnalysis {
    pub platform: Platform,
    pub is_live: bool,
}

/// Tag a URL with its platform and whether it looks like a live stream
pub fn classify(url: &str) -> UrlAnalysis {
    if url.is_empty() {
        return UrlAnalysis::default();
    }

    let lower = url.to_lowercase();
    let platform = KNOWN_PLATFORMS
        .iter()
        .copied()
        .find(|p| p.matches(url, &lower))
        .unwrap_or(Platform::Unknown);

    // Twitch channel pages are live unless they point at a VOD or a clip
    let twitch_channel =
        platform == Platform::Twitch && !url.contains("/videos/") && !url.contains("/clip/");
    let is_live = url.contains("live") || twitch_channel;

    UrlAnalysis { platform, is_live }
}
