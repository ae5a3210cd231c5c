//! Widget styles
//!
//! Surfaces follow the active dark/light palette; the accent gradient and
//! status colors are shared by both.

use crate::backend::messages::LogLevel;
use crate::extractor::classifier::Platform;
use crate::utils::config::ThemeChoice;
use iced::widget::{button, container, progress_bar};
use iced::{Background, Border, Color, Gradient, Shadow, Theme, Vector};

pub const INDIGO_500: Color = Color::from_rgb(0.388, 0.400, 0.945);
pub const PURPLE_500: Color = Color::from_rgb(0.545, 0.361, 0.965);
pub const PINK_500: Color = Color::from_rgb(0.925, 0.282, 0.600);

pub const SUCCESS: Color = Color::from_rgb(0.063, 0.725, 0.506);
pub const WARNING: Color = Color::from_rgb(0.961, 0.620, 0.094);
pub const DANGER: Color = Color::from_rgb(0.937, 0.267, 0.267);
pub const MUTED: Color = Color::from_rgb(0.420, 0.447, 0.502);

const YOUTUBE_RED: Color = Color::from_rgb(0.996, 0.0, 0.0);
const BILIBILI_BLUE: Color = Color::from_rgb(0.0, 0.682, 0.925);
const TWITCH_PURPLE: Color = Color::from_rgb(0.569, 0.275, 1.0);

pub fn iced_theme(choice: ThemeChoice) -> Theme {
    match choice {
        ThemeChoice::Dark => Theme::Dark,
        ThemeChoice::Light => Theme::Light,
    }
}

pub fn log_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Info => MUTED,
        LogLevel::Warn => WARNING,
        LogLevel::Error => DANGER,
        LogLevel::Success => SUCCESS,
    }
}

fn accent_gradient(angle: f32) -> Background {
    Background::Gradient(Gradient::Linear(
        iced::gradient::Linear::new(iced::Radians(angle))
            .add_stop(0.0, INDIGO_500)
            .add_stop(0.5, PURPLE_500)
            .add_stop(1.0, PINK_500),
    ))
}

// --- Container Styles ---

pub struct CardContainer;

impl container::StyleSheet for CardContainer {
    type Style = Theme;

    fn appearance(&self, style: &Self::Style) -> container::Appearance {
        let palette = style.extended_palette();
        container::Appearance {
            text_color: Some(palette.background.base.text),
            background: Some(Background::Color(palette.background.weak.color)),
            border: Border {
                color: palette.background.strong.color,
                width: 1.0,
                radius: 16.0.into(),
            },
            shadow: Shadow {
                color: Color::from_rgba(0.0, 0.0, 0.0, 0.08),
                offset: Vector::new(0.0, 4.0),
                blur_radius: 12.0,
            },
        }
    }
}

pub struct SidebarContainer;

impl container::StyleSheet for SidebarContainer {
    type Style = Theme;

    fn appearance(&self, style: &Self::Style) -> container::Appearance {
        let palette = style.extended_palette();
        container::Appearance {
            text_color: Some(palette.background.base.text),
            background: Some(Background::Color(palette.background.weak.color)),
            border: Border {
                color: palette.background.strong.color,
                width: 1.0,
                radius: 0.0.into(),
            },
            ..Default::default()
        }
    }
}

/// Rounded platform tag next to the URL field
pub struct PlatformBadge(pub Platform);

impl container::StyleSheet for PlatformBadge {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        let color = match self.0 {
            Platform::Youtube => YOUTUBE_RED,
            Platform::Bilibili => BILIBILI_BLUE,
            Platform::Twitch => TWITCH_PURPLE,
            Platform::Unknown => MUTED,
        };
        container::Appearance {
            text_color: Some(Color::WHITE),
            background: Some(Background::Color(color)),
            border: Border {
                radius: 8.0.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

pub struct LiveBadge;

impl container::StyleSheet for LiveBadge {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            text_color: Some(Color::WHITE),
            background: Some(Background::Color(DANGER)),
            border: Border {
                radius: 8.0.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

// --- Button Styles ---

pub struct PrimaryButton;

impl button::StyleSheet for PrimaryButton {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: Some(accent_gradient(0.0)),
            text_color: Color::WHITE,
            border: Border {
                radius: 16.0.into(),
                ..Default::default()
            },
            shadow: Shadow {
                color: Color::from_rgba(0.388, 0.400, 0.945, 0.3),
                offset: Vector::new(0.0, 4.0),
                blur_radius: 12.0,
            },
            shadow_offset: Vector::new(0.0, 0.0),
        }
    }

    fn hovered(&self, style: &Self::Style) -> button::Appearance {
        let active = self.active(style);
        button::Appearance {
            shadow: Shadow {
                color: Color::from_rgba(0.388, 0.400, 0.945, 0.4),
                offset: Vector::new(0.0, 6.0),
                blur_radius: 20.0,
            },
            ..active
        }
    }

    fn disabled(&self, style: &Self::Style) -> button::Appearance {
        let active = self.active(style);
        button::Appearance {
            background: Some(Background::Color(MUTED)),
            shadow: Shadow::default(),
            ..active
        }
    }
}

pub struct SecondaryButton;

impl button::StyleSheet for SecondaryButton {
    type Style = Theme;

    fn active(&self, style: &Self::Style) -> button::Appearance {
        let palette = style.extended_palette();
        button::Appearance {
            background: Some(Background::Color(palette.background.base.color)),
            text_color: palette.background.base.text,
            border: Border {
                radius: 12.0.into(),
                color: palette.background.strong.color,
                width: 1.0,
            },
            ..Default::default()
        }
    }

    fn hovered(&self, style: &Self::Style) -> button::Appearance {
        let active = self.active(style);
        button::Appearance {
            background: Some(Background::Color(style.extended_palette().background.weak.color)),
            ..active
        }
    }
}

pub enum SidebarButtonStyle {
    Active,
    Inactive,
}

impl button::StyleSheet for SidebarButtonStyle {
    type Style = Theme;

    fn active(&self, style: &Self::Style) -> button::Appearance {
        let palette = style.extended_palette();
        let border = Border {
            radius: 12.0.into(),
            ..Default::default()
        };
        match self {
            Self::Active => button::Appearance {
                background: Some(Background::Color(Color::from_rgba(
                    0.388, 0.400, 0.945, 0.15,
                ))),
                text_color: palette.background.base.text,
                border,
                ..Default::default()
            },
            Self::Inactive => button::Appearance {
                background: None,
                text_color: palette.background.strong.text,
                border,
                ..Default::default()
            },
        }
    }

    fn hovered(&self, style: &Self::Style) -> button::Appearance {
        match self {
            Self::Active => self.active(style),
            Self::Inactive => button::Appearance {
                background: Some(Background::Color(
                    style.extended_palette().background.strong.color,
                )),
                ..self.active(style)
            },
        }
    }
}

// --- Progress Bar Styles ---

pub enum ProgressBarStyle {
    Running,
    Done,
    Failed,
}

impl progress_bar::StyleSheet for ProgressBarStyle {
    type Style = Theme;

    fn appearance(&self, style: &Self::Style) -> progress_bar::Appearance {
        let bar = match self {
            Self::Running => accent_gradient(0.0),
            Self::Done => Background::Color(SUCCESS),
            Self::Failed => Background::Color(DANGER),
        };
        progress_bar::Appearance {
            background: Background::Color(style.extended_palette().background.strong.color),
            bar,
            border_radius: 4.0.into(),
        }
    }
}
