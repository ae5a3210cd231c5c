//! Download form, task progress and the log panel

use crate::backend::messages::LogEntry;
use crate::extractor::options::{DownloadMode, VideoQuality};
use crate::gui::app::{DownloadForm, Message, TaskRow};
use crate::gui::components::{log_panel, progress_bar, url_input};
use crate::gui::theme;
use iced::widget::{button, checkbox, column, container, pick_list, row, text, Space};
use iced::{Alignment, Element, Length};

pub fn main_view<'a>(
    form: &DownloadForm,
    tasks: &[TaskRow],
    logs: &[LogEntry],
) -> Element<'a, Message> {
    let can_download = !form.url.trim().is_empty();

    let options_row = row![
        labeled(
            "Mode",
            pick_list(DownloadMode::ALL.to_vec(), Some(form.mode), Message::ModeSelected)
                .text_size(13)
                .width(Length::Fixed(130.0))
                .into(),
        ),
        labeled(
            "Quality",
            if form.mode == DownloadMode::Video {
                pick_list(
                    VideoQuality::ALL.to_vec(),
                    Some(form.quality),
                    Message::QualitySelected,
                )
                .text_size(13)
                .width(Length::Fixed(150.0))
                .into()
            } else {
                text("n/a").size(13).into()
            },
        ),
        column![
            checkbox("Embed cover", form.embed_cover).on_toggle(Message::EmbedCoverToggled),
            checkbox("Embed metadata", form.embed_meta).on_toggle(Message::EmbedMetaToggled),
        ]
        .spacing(6),
        checkbox("Live: record from start", form.live_mode).on_toggle(Message::LiveModeToggled),
        Space::with_width(Length::Fill),
        button(text("Open folder").size(14))
            .on_press(Message::OpenOutputFolder)
            .padding([10, 16])
            .style(iced::theme::Button::Custom(Box::new(theme::SecondaryButton))),
        button(text("Download").size(16))
            .on_press_maybe(can_download.then_some(Message::DownloadPressed))
            .padding([14, 28])
            .style(iced::theme::Button::Custom(Box::new(theme::PrimaryButton))),
    ]
    .spacing(20)
    .align_items(Alignment::Center);

    let form_card = container(
        column![
            text("New download").size(24),
            url_input(&form.url, form.analysis),
            options_row,
        ]
        .spacing(16),
    )
    .padding(24)
    .width(Length::Fill)
    .style(iced::theme::Container::Custom(Box::new(theme::CardContainer)));

    let tasks_section: Element<'a, Message> = if tasks.is_empty() {
        text("No downloads yet")
            .size(13)
            .style(iced::theme::Text::Color(theme::MUTED))
            .into()
    } else {
        column(
            tasks
                .iter()
                .map(|task| progress_bar(&task.label, task.percent, &task.status, task.state)),
        )
        .spacing(12)
        .into()
    };

    let log_card = container(
        column![
            row![
                text("Log").size(16),
                Space::with_width(Length::Fill),
                button(text("Clear").size(12))
                    .on_press(Message::ClearLog)
                    .padding([4, 10])
                    .style(iced::theme::Button::Custom(Box::new(theme::SecondaryButton))),
            ]
            .align_items(Alignment::Center),
            log_panel(logs),
        ]
        .spacing(8),
    )
    .padding(16)
    .width(Length::Fill)
    .height(Length::Fill)
    .style(iced::theme::Container::Custom(Box::new(theme::CardContainer)));

    column![form_card, tasks_section, log_card]
        .spacing(20)
        .padding(24)
        .into()
}

fn labeled<'a>(label: &'static str, control: Element<'a, Message>) -> Element<'a, Message> {
    column![
        text(label)
            .size(11)
            .style(iced::theme::Text::Color(theme::MUTED)),
        control,
    ]
    .spacing(4)
    .into()
}
