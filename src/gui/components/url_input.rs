//! URL field with paste/clear buttons and the analysis badges

use crate::extractor::classifier::{Platform, UrlAnalysis};
use crate::gui::app::Message;
use crate::gui::theme;
use iced::widget::{button, container, row, text, text_input, tooltip};
use iced::{Alignment, Element, Length};

pub fn url_input<'a>(value: &str, analysis: UrlAnalysis) -> Element<'a, Message> {
    let mut input_row = row![
        text_input("Paste a YouTube, Bilibili or Twitch link...", value)
            .on_input(Message::UrlInputChanged)
            .on_submit(Message::DownloadPressed)
            .padding(15)
            .width(Length::Fill),
        tooltip(
            button(text("Paste").size(14))
                .on_press(Message::PasteFromClipboard)
                .padding([8, 12])
                .style(iced::theme::Button::Custom(Box::new(theme::SecondaryButton))),
            "Paste from clipboard",
            tooltip::Position::Bottom,
        ),
        button(text("Clear").size(14))
            .on_press(Message::ClearUrlInput)
            .padding([8, 12])
            .style(iced::theme::Button::Custom(Box::new(theme::SecondaryButton))),
    ]
    .spacing(12)
    .align_items(Alignment::Center);

    if !value.trim().is_empty() {
        input_row = input_row.push(badges(analysis));
    }

    input_row.into()
}

fn badges<'a>(analysis: UrlAnalysis) -> Element<'a, Message> {
    let label = match analysis.platform {
        Platform::Youtube => "YouTube",
        Platform::Bilibili => "Bilibili",
        Platform::Twitch => "Twitch",
        Platform::Unknown => "Other",
    };

    let platform = container(text(label).size(12))
        .padding([4, 8])
        .style(iced::theme::Container::Custom(Box::new(
            theme::PlatformBadge(analysis.platform),
        )));

    if analysis.is_live {
        let live = container(text("LIVE").size(12))
            .padding([4, 8])
            .style(iced::theme::Container::Custom(Box::new(theme::LiveBadge)));
        row![platform, live].spacing(6).into()
    } else {
        platform.into()
    }
}
