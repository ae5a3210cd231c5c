//! Progress bar for one download task

use crate::downloader::progress::TaskState;
use crate::gui::app::Message;
use crate::gui::theme;
use iced::widget::{column, progress_bar as iced_progress_bar, row, text, Space};
use iced::{Element, Length};

/// `percent` is 0..=100
pub fn progress_bar<'a>(
    label: &str,
    percent: f32,
    status: &str,
    state: TaskState,
) -> Element<'a, Message> {
    let style = match state {
        TaskState::Succeeded => theme::ProgressBarStyle::Done,
        TaskState::Failed => theme::ProgressBarStyle::Failed,
        _ => theme::ProgressBarStyle::Running,
    };

    let bar = iced_progress_bar(0.0..=100.0, percent)
        .height(Length::Fixed(8.0))
        .style(iced::theme::ProgressBar::Custom(Box::new(style)));

    column![
        row![
            text(label.to_string()).size(13),
            Space::with_width(Length::Fill),
            text(format!("{:.1}%", percent)).size(13),
        ],
        bar,
        text(status.to_string())
            .size(12)
            .style(iced::theme::Text::Color(theme::MUTED)),
    ]
    .spacing(6)
    .into()
}
