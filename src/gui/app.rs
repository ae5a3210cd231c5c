//! Main GUI application

use crate::backend::bridge::UiBridge;
use crate::backend::messages::{BackendEvent, LogEntry, TaskId};
use crate::downloader::progress::TaskState;
use crate::extractor::classifier::UrlAnalysis;
use crate::extractor::options::{DownloadMode, DownloadRequest, VideoQuality};
use crate::gui::clipboard;
use crate::gui::components::log_panel::log_scroll_id;
use crate::gui::theme;
use crate::gui::views::settings_view::COVER_FORMATS;
use crate::gui::views::{main_view, settings_view};
use crate::utils::config::{AppConfig, ConfigStore, ThemeChoice};
use iced::widget::scrollable;
use iced::{Application, Command, Element, Length, Subscription, Theme};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Oldest lines are dropped beyond this
const MAX_LOG_LINES: usize = 500;

/// Oldest finished rows are dropped beyond this; running rows always stay
const MAX_TASK_ROWS: usize = 50;

/// Everything the GUI needs from `main`
pub struct AppFlags {
    /// Runtime the downloads run on; kept alive for the app lifetime
    pub runtime: Arc<Runtime>,
    pub config: Arc<ConfigStore>,
}

/// Main application state
pub struct MediaGrabApp {
    bridge: UiBridge,
    _runtime: Arc<Runtime>,

    current_view: View,

    /// Last saved settings
    config: AppConfig,
    /// Settings being edited
    draft: AppConfig,

    form: DownloadForm,
    tasks: Vec<TaskRow>,
    logs: Vec<LogEntry>,
}

/// Application view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Main,
    Settings,
}

/// The download form on the main view
#[derive(Debug, Clone, Default)]
pub struct DownloadForm {
    pub url: String,
    pub analysis: UrlAnalysis,
    pub mode: DownloadMode,
    pub quality: VideoQuality,
    pub embed_cover: bool,
    pub embed_meta: bool,
    pub live_mode: bool,
}

impl DownloadForm {
    fn from_config(config: &AppConfig) -> Self {
        let prefs = &config.default_preferences;
        Self {
            quality: VideoQuality::parse(&prefs.video_resolution),
            embed_cover: prefs.embed_thumbnail,
            embed_meta: prefs.embed_metadata,
            ..Self::default()
        }
    }

    fn request(&self, config: &AppConfig) -> DownloadRequest {
        let mut request = DownloadRequest::from_preferences(
            self.url.trim(),
            self.mode,
            &config.default_preferences,
        );
        request.video_quality = self.quality;
        request.embed_cover = self.embed_cover;
        request.embed_meta = self.embed_meta;
        request.live_mode = self.live_mode;
        request
    }
}

/// One started download as shown in the UI
#[derive(Debug, Clone)]
pub struct TaskRow {
    pub id: TaskId,
    pub label: String,
    /// 0..=100
    pub percent: f32,
    pub status: String,
    pub state: TaskState,
}

impl TaskRow {
    fn new(id: TaskId, label: String) -> Self {
        Self {
            id,
            label,
            percent: 0.0,
            status: "Starting...".to_string(),
            state: TaskState::Started,
        }
    }
}

/// Application messages
#[derive(Debug, Clone)]
pub enum Message {
    // Download form
    UrlInputChanged(String),
    PasteFromClipboard,
    ClearUrlInput,
    ModeSelected(DownloadMode),
    QualitySelected(VideoQuality),
    EmbedCoverToggled(bool),
    EmbedMetaToggled(bool),
    LiveModeToggled(bool),
    DownloadPressed,
    OpenOutputFolder,
    ClearLog,

    // View navigation
    SwitchToMain,
    SwitchToSettings,

    // Settings
    OutputDirChanged(String),
    BrowseOutputDir,
    EncoderPathChanged(String),
    BrowseEncoder,
    ThemeSelected(ThemeChoice),
    VideoFormatSelected(&'static str),
    AudioFormatSelected(&'static str),
    AudioBitrateSelected(&'static str),
    CoverFormatSelected(&'static str),
    DefaultEmbedCoverToggled(bool),
    DefaultEmbedMetaToggled(bool),
    RetriesChanged(String),
    FragmentRetriesChanged(String),
    UserAgentChanged(String),
    CheckOnStartupToggled(bool),
    CheckDependencies,
    SaveSettings,
    DiscardSettings,

    // System
    Tick, // Drains backend events
}

impl Application for MediaGrabApp {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = AppFlags;

    fn new(flags: Self::Flags) -> (Self, Command<Message>) {
        let bridge = UiBridge::with_ytdlp(flags.runtime.handle().clone(), flags.config);
        let config = bridge.init_app();
        info!("GUI started with output folder {}", config.output_root().display());

        let app = Self {
            bridge,
            _runtime: flags.runtime,
            current_view: View::Main,
            form: DownloadForm::from_config(&config),
            draft: config.clone(),
            config,
            tasks: Vec::new(),
            logs: Vec::new(),
        };

        (app, Command::none())
    }

    fn title(&self) -> String {
        String::from("MediaGrab")
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::UrlInputChanged(url) => {
                self.set_url(url);
                Command::none()
            }

            Message::PasteFromClipboard => {
                match clipboard::paste_url() {
                    Ok(url) => self.set_url(url),
                    Err(e) => debug!("Paste failed: {}", e),
                }
                Command::none()
            }

            Message::ClearUrlInput => {
                self.set_url(String::new());
                Command::none()
            }

            Message::ModeSelected(mode) => {
                self.form.mode = mode;
                Command::none()
            }

            Message::QualitySelected(quality) => {
                self.form.quality = quality;
                Command::none()
            }

            Message::EmbedCoverToggled(value) => {
                self.form.embed_cover = value;
                Command::none()
            }

            Message::EmbedMetaToggled(value) => {
                self.form.embed_meta = value;
                Command::none()
            }

            Message::LiveModeToggled(value) => {
                self.form.live_mode = value;
                Command::none()
            }

            Message::DownloadPressed => {
                if self.form.url.trim().is_empty() {
                    return Command::none();
                }
                let request = self.form.request(&self.config);
                let label = format!("{} [{}]", request.url, request.mode);
                if let Some(id) = self.bridge.start_download_task(request) {
                    self.tasks.insert(0, TaskRow::new(id, label));
                    prune_finished(&mut self.tasks, MAX_TASK_ROWS);
                    self.set_url(String::new());
                }
                Command::none()
            }

            Message::OpenOutputFolder => {
                // Failures are reported as log events
                let _ = self.bridge.open_output_folder(self.form.mode);
                Command::none()
            }

            Message::ClearLog => {
                self.logs.clear();
                Command::none()
            }

            Message::SwitchToMain => {
                self.current_view = View::Main;
                Command::none()
            }

            Message::SwitchToSettings => {
                self.current_view = View::Settings;
                Command::none()
            }

            Message::OutputDirChanged(value) => {
                self.draft.system_settings.output_directory = PathBuf::from(value);
                Command::none()
            }

            Message::BrowseOutputDir => {
                if let Some(path) = self.bridge.select_directory() {
                    self.draft.system_settings.output_directory = path;
                }
                Command::none()
            }

            Message::EncoderPathChanged(value) => {
                self.draft.system_settings.ffmpeg_path = PathBuf::from(value);
                Command::none()
            }

            Message::BrowseEncoder => {
                if let Some(path) = self.bridge.select_encoder_file() {
                    self.draft.system_settings.ffmpeg_path = path;
                }
                Command::none()
            }

            Message::ThemeSelected(choice) => {
                self.draft.system_settings.theme = choice;
                Command::none()
            }

            Message::VideoFormatSelected(format) => {
                self.draft.default_preferences.video_format = format.to_string();
                Command::none()
            }

            Message::AudioFormatSelected(format) => {
                self.draft.default_preferences.audio_format = format.to_string();
                Command::none()
            }

            Message::AudioBitrateSelected(bitrate) => {
                self.draft.default_preferences.audio_bitrate = bitrate.to_string();
                Command::none()
            }

            Message::CoverFormatSelected(format) => {
                self.draft.default_preferences.cover_format = if format == COVER_FORMATS[0] {
                    String::new()
                } else {
                    format.to_string()
                };
                Command::none()
            }

            Message::DefaultEmbedCoverToggled(value) => {
                self.draft.default_preferences.embed_thumbnail = value;
                Command::none()
            }

            Message::DefaultEmbedMetaToggled(value) => {
                self.draft.default_preferences.embed_metadata = value;
                Command::none()
            }

            Message::RetriesChanged(value) => {
                if let Some(n) = parse_count(&value) {
                    self.draft.advanced.retries = n;
                }
                Command::none()
            }

            Message::FragmentRetriesChanged(value) => {
                if let Some(n) = parse_count(&value) {
                    self.draft.advanced.fragment_retries = n;
                }
                Command::none()
            }

            Message::UserAgentChanged(value) => {
                self.draft.advanced.user_agent = value;
                Command::none()
            }

            Message::CheckOnStartupToggled(value) => {
                self.draft.advanced.check_dependencies_on_startup = value;
                Command::none()
            }

            Message::CheckDependencies => {
                self.bridge.check_dependencies();
                Command::none()
            }

            Message::SaveSettings => {
                // Errors arrive as log events and the draft is kept for fixing
                if self.bridge.update_config(self.draft.clone()).is_ok() {
                    self.config = self.draft.clone();
                    let form = DownloadForm::from_config(&self.config);
                    self.form.quality = form.quality;
                    self.form.embed_cover = form.embed_cover;
                    self.form.embed_meta = form.embed_meta;
                }
                Command::none()
            }

            Message::DiscardSettings => {
                self.draft = self.config.clone();
                Command::none()
            }

            Message::Tick => {
                let mut logged = false;
                while let Some(event) = self.bridge.try_receive_event() {
                    logged |= matches!(event, BackendEvent::Log(_));
                    self.apply_event(event);
                }
                if logged {
                    scrollable::snap_to(log_scroll_id(), scrollable::RelativeOffset::END)
                } else {
                    Command::none()
                }
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        use iced::widget::{column, container, row, text, Space};

        let sidebar = container(
            column![
                container(text("MediaGrab").size(24)).padding(20),
                Space::with_height(20),
                nav_button("Downloads", View::Main, self.current_view, Message::SwitchToMain),
                nav_button(
                    "Settings",
                    View::Settings,
                    self.current_view,
                    Message::SwitchToSettings
                ),
            ]
            .spacing(8)
            .padding(10),
        )
        .width(Length::Fixed(200.0))
        .height(Length::Fill)
        .style(iced::theme::Container::Custom(Box::new(
            theme::SidebarContainer,
        )));

        let content = match self.current_view {
            View::Main => main_view(&self.form, &self.tasks, &self.logs),
            View::Settings => settings_view(&self.draft, self.draft != self.config),
        };

        row![
            sidebar,
            container(content).width(Length::Fill).height(Length::Fill)
        ]
        .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(std::time::Duration::from_millis(100)).map(|_| Message::Tick)
    }

    fn theme(&self) -> Self::Theme {
        theme::iced_theme(self.config.system_settings.theme)
    }
}

impl MediaGrabApp {
    fn set_url(&mut self, url: String) {
        let analysis = self.bridge.analyze_url(&url);
        // Pre-tick live mode for streams; the user can still untick it
        if analysis.is_live && !self.form.analysis.is_live {
            self.form.live_mode = true;
        } else if !analysis.is_live {
            self.form.live_mode = false;
        }
        self.form.analysis = analysis;
        self.form.url = url;
    }

    fn apply_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Log(entry) => {
                self.logs.push(entry);
                if self.logs.len() > MAX_LOG_LINES {
                    let excess = self.logs.len() - MAX_LOG_LINES;
                    self.logs.drain(..excess);
                }
            }
            BackendEvent::Progress {
                task_id,
                percent,
                status,
            } => {
                let row = self.task_row(task_id);
                row.percent = percent;
                row.status = status;
            }
            BackendEvent::TaskState { task_id, state } => {
                self.task_row(task_id).state = state;
            }
        }
    }

    fn task_row(&mut self, task_id: TaskId) -> &mut TaskRow {
        match self.tasks.iter().position(|t| t.id == task_id) {
            Some(index) => &mut self.tasks[index],
            None => {
                let short: String = task_id.chars().take(8).collect();
                let label = format!("Task {}", short);
                self.tasks.insert(0, TaskRow::new(task_id, label));
                prune_finished(&mut self.tasks, MAX_TASK_ROWS);
                &mut self.tasks[0]
            }
        }
    }
}

/// Drop the oldest terminal rows until at most `max` remain
///
/// Rows are kept newest first, so the search runs from the back.
fn prune_finished(tasks: &mut Vec<TaskRow>, max: usize) {
    while tasks.len() > max {
        match tasks.iter().rposition(|t| t.state.is_terminal()) {
            Some(index) => {
                tasks.remove(index);
            }
            None => break,
        }
    }
}

fn nav_button<'a>(
    label: &'static str,
    target: View,
    current: View,
    on_press: Message,
) -> Element<'a, Message> {
    use iced::widget::{button, text};

    let style = if current == target {
        theme::SidebarButtonStyle::Active
    } else {
        theme::SidebarButtonStyle::Inactive
    };

    button(text(label).size(16))
        .style(iced::theme::Button::Custom(Box::new(style)))
        .width(Length::Fill)
        .padding(12)
        .on_press(on_press)
        .into()
}

/// Non-negative integer from a settings field; empty counts as zero
fn parse_count(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0);
    }
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, state: TaskState) -> TaskRow {
        let mut row = TaskRow::new(id.to_string(), id.to_string());
        row.state = state;
        row
    }

    #[test]
    fn test_prune_drops_oldest_finished_rows_first() {
        let mut tasks = vec![
            row("new", TaskState::Started),
            row("done-2", TaskState::Succeeded),
            row("running", TaskState::Downloading),
            row("done-1", TaskState::Failed),
            row("done-0", TaskState::Succeeded),
        ];

        prune_finished(&mut tasks, 3);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "done-2", "running"]);
    }

    #[test]
    fn test_prune_keeps_running_rows_over_the_cap() {
        let mut tasks: Vec<TaskRow> = (0..MAX_TASK_ROWS + 5)
            .map(|i| row(&format!("t{}", i), TaskState::Downloading))
            .collect();
        tasks.push(row("old-done", TaskState::Succeeded));

        prune_finished(&mut tasks, MAX_TASK_ROWS);
        assert_eq!(tasks.len(), MAX_TASK_ROWS + 5);
        assert!(tasks.iter().all(|t| !t.state.is_terminal()));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("5"), Some(5));
        assert_eq!(parse_count(" "), Some(0));
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("abc"), None);
    }

    #[test]
    fn test_form_request_uses_saved_formats_and_form_flags() {
        let mut config = AppConfig::default();
        config.default_preferences.audio_format = "mp3".to_string();

        let form = DownloadForm {
            url: "  https://youtu.be/abc ".to_string(),
            mode: DownloadMode::Audio,
            quality: VideoQuality::Hd720,
            embed_cover: false,
            embed_meta: true,
            live_mode: true,
            ..DownloadForm::default()
        };

        let request = form.request(&config);
        assert_eq!(request.url, "https://youtu.be/abc");
        assert_eq!(request.mode, DownloadMode::Audio);
        assert_eq!(request.audio_format, "mp3");
        assert_eq!(request.video_quality, VideoQuality::Hd720);
        assert!(!request.embed_cover);
        assert!(request.live_mode);
    }

    #[test]
    fn test_form_defaults_follow_preferences() {
        let mut config = AppConfig::default();
        config.default_preferences.video_resolution = "1080".to_string();
        config.default_preferences.embed_thumbnail = false;

        let form = DownloadForm::from_config(&config);
        assert_eq!(form.quality, VideoQuality::Fhd1080);
        assert!(!form.embed_cover);
        assert!(form.embed_meta);
    }
}
