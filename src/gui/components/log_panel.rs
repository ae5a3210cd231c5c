//! Scrolling log of backend events

use crate::backend::messages::LogEntry;
use crate::gui::app::Message;
use crate::gui::theme;
use iced::widget::scrollable::Id;
use iced::widget::{column, row, scrollable, text};
use iced::{Element, Length};

/// Lets the app keep the panel scrolled to the newest line
pub fn log_scroll_id() -> Id {
    Id::new("log-panel")
}

pub fn log_panel<'a>(entries: &[LogEntry]) -> Element<'a, Message> {
    let lines = entries.iter().map(|entry| {
        row![
            text(entry.timestamp.format("%H:%M:%S").to_string())
                .size(12)
                .style(iced::theme::Text::Color(theme::MUTED)),
            text(format!("[{}]", entry.level))
                .size(12)
                .style(iced::theme::Text::Color(theme::log_color(entry.level))),
            text(entry.message.clone()).size(12),
        ]
        .spacing(8)
        .into()
    });

    scrollable(column(lines).spacing(4).width(Length::Fill))
        .id(log_scroll_id())
        .height(Length::Fill)
        .width(Length::Fill)
        .into()
}
