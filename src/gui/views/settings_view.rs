//! Settings view

use crate::gui::app::Message;
use crate::gui::theme;
use crate::utils::config::{AppConfig, ThemeChoice};
use iced::widget::{
    button, checkbox, column, container, pick_list, row, scrollable, text, text_input, Space,
};
use iced::{Alignment, Element, Length};

pub const VIDEO_FORMATS: [&str; 3] = ["mp4", "mkv", "webm"];
pub const AUDIO_FORMATS: [&str; 5] = ["m4a", "mp3", "opus", "flac", "wav"];
pub const AUDIO_BITRATES: [&str; 4] = ["128", "192", "256", "320"];
/// "original" keeps the thumbnail as served
pub const COVER_FORMATS: [&str; 4] = ["original", "jpg", "png", "webp"];

/// `draft` holds unsaved edits; `dirty` enables the save button
pub fn settings_view<'a>(draft: &AppConfig, dirty: bool) -> Element<'a, Message> {
    let system = &draft.system_settings;
    let prefs = &draft.default_preferences;
    let advanced = &draft.advanced;

    let paths_section = section(
        "Paths",
        column![
            path_row(
                "Download folder",
                &system.output_directory.display().to_string(),
                Message::OutputDirChanged,
                Message::BrowseOutputDir,
            ),
            path_row(
                "FFmpeg executable",
                &system.ffmpeg_path.display().to_string(),
                Message::EncoderPathChanged,
                Message::BrowseEncoder,
            ),
        ]
        .spacing(12),
    );

    let cover_choice = if prefs.cover_format.is_empty() {
        COVER_FORMATS[0]
    } else {
        COVER_FORMATS
            .iter()
            .copied()
            .find(|f| *f == prefs.cover_format)
            .unwrap_or(COVER_FORMATS[0])
    };

    let defaults_section = section(
        "Defaults",
        column![
            setting_row(
                "Video container",
                pick_list(
                    VIDEO_FORMATS.to_vec(),
                    VIDEO_FORMATS.iter().copied().find(|f| *f == prefs.video_format),
                    Message::VideoFormatSelected,
                )
                .into(),
            ),
            setting_row(
                "Audio format",
                pick_list(
                    AUDIO_FORMATS.to_vec(),
                    AUDIO_FORMATS.iter().copied().find(|f| *f == prefs.audio_format),
                    Message::AudioFormatSelected,
                )
                .into(),
            ),
            setting_row(
                "Audio bitrate (kbps)",
                pick_list(
                    AUDIO_BITRATES.to_vec(),
                    AUDIO_BITRATES.iter().copied().find(|f| *f == prefs.audio_bitrate),
                    Message::AudioBitrateSelected,
                )
                .into(),
            ),
            setting_row(
                "Cover format",
                pick_list(COVER_FORMATS.to_vec(), Some(cover_choice), Message::CoverFormatSelected)
                    .into(),
            ),
            checkbox("Embed cover by default", prefs.embed_thumbnail)
                .on_toggle(Message::DefaultEmbedCoverToggled),
            checkbox("Embed metadata by default", prefs.embed_metadata)
                .on_toggle(Message::DefaultEmbedMetaToggled),
        ]
        .spacing(12),
    );

    let advanced_section = section(
        "Advanced",
        column![
            setting_row(
                "Theme",
                pick_list(ThemeChoice::ALL.to_vec(), Some(system.theme), Message::ThemeSelected)
                    .into(),
            ),
            setting_row(
                "Retries",
                text_input("10", &advanced.retries.to_string())
                    .on_input(Message::RetriesChanged)
                    .width(Length::Fixed(80.0))
                    .into(),
            ),
            setting_row(
                "Fragment retries",
                text_input("10", &advanced.fragment_retries.to_string())
                    .on_input(Message::FragmentRetriesChanged)
                    .width(Length::Fixed(80.0))
                    .into(),
            ),
            column![
                text("User agent").size(14),
                text_input("", &advanced.user_agent)
                    .on_input(Message::UserAgentChanged)
                    .padding(10),
            ]
            .spacing(6),
            row![
                checkbox(
                    "Check yt-dlp and FFmpeg on startup",
                    advanced.check_dependencies_on_startup
                )
                .on_toggle(Message::CheckOnStartupToggled),
                Space::with_width(Length::Fill),
                button(text("Check now").size(14))
                    .on_press(Message::CheckDependencies)
                    .padding([8, 14])
                    .style(iced::theme::Button::Custom(Box::new(theme::SecondaryButton))),
            ]
            .align_items(Alignment::Center),
        ]
        .spacing(12),
    );

    let footer = row![
        Space::with_width(Length::Fill),
        button(text("Discard").size(14))
            .on_press_maybe(dirty.then_some(Message::DiscardSettings))
            .padding([10, 18])
            .style(iced::theme::Button::Custom(Box::new(theme::SecondaryButton))),
        button(text("Save").size(14))
            .on_press_maybe(dirty.then_some(Message::SaveSettings))
            .padding([10, 24])
            .style(iced::theme::Button::Custom(Box::new(theme::PrimaryButton))),
    ]
    .spacing(10);

    scrollable(
        column![
            text("Settings").size(24),
            paths_section,
            defaults_section,
            advanced_section,
            footer,
        ]
        .spacing(20)
        .padding(24),
    )
    .into()
}

fn section<'a>(
    title: &'static str,
    body: iced::widget::Column<'a, Message>,
) -> Element<'a, Message> {
    container(column![text(title).size(16), body].spacing(12))
        .padding(20)
        .width(Length::Fill)
        .style(iced::theme::Container::Custom(Box::new(theme::CardContainer)))
        .into()
}

fn setting_row<'a>(label: &'static str, control: Element<'a, Message>) -> Element<'a, Message> {
    row![
        text(label).size(14),
        Space::with_width(Length::Fill),
        control,
    ]
    .align_items(Alignment::Center)
    .into()
}

fn path_row<'a>(
    label: &'static str,
    value: &str,
    on_change: fn(String) -> Message,
    on_browse: Message,
) -> Element<'a, Message> {
    column![
        text(label).size(14),
        row![
            text_input("", value)
                .on_input(on_change)
                .padding(10)
                .width(Length::Fill),
            button(text("Browse...").size(14))
                .on_press(on_browse)
                .padding([10, 16])
                .style(iced::theme::Button::Custom(Box::new(theme::SecondaryButton))),
        ]
        .spacing(10)
        .align_items(Alignment::Center),
    ]
    .spacing(6)
    .into()
}
