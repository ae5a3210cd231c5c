use async_trait::async_trait;
use mediagrab::backend::{event_channel, BackendEvent, LogLevel};
use mediagrab::downloader::{Dispatcher, TaskState};
use mediagrab::extractor::{
    DownloadMode, DownloadRequest, ExtractionOptions, MediaExtractor, ProgressHook,
    TransferProgress,
};
use mediagrab::utils::{ConfigStore, MediaGrabError};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};
use tokio::runtime::Handle;

/// Extractor that reports a fixed sequence and then succeeds or fails
struct ScriptedExtractor {
    failure: Option<String>,
    seen: Mutex<Vec<(String, ExtractionOptions)>>,
}

impl ScriptedExtractor {
    fn succeeding() -> Self {
        Self {
            failure: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MediaExtractor for ScriptedExtractor {
    fn id(&self) -> &'static str {
        "scripted"
    }

    async fn download(
        &self,
        url: &str,
        options: &ExtractionOptions,
        hook: &mut dyn ProgressHook,
    ) -> mediagrab::utils::error::Result<()> {
        self.seen
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));

        hook.on_progress(TransferProgress {
            percent: 42.0,
            speed: "2.00MiB/s".to_string(),
            eta: "00:05".to_string(),
        });
        hook.on_warning("slow connection");

        match &self.failure {
            None => {
                hook.on_finished();
                Ok(())
            }
            Some(message) => {
                hook.on_error(message);
                Err(MediaGrabError::ExtractionError(message.clone()))
            }
        }
    }
}

/// Extractor that reports some progress and then panics
struct PanickingExtractor;

#[async_trait]
impl MediaExtractor for PanickingExtractor {
    fn id(&self) -> &'static str {
        "panicking"
    }

    async fn download(
        &self,
        _url: &str,
        _options: &ExtractionOptions,
        hook: &mut dyn ProgressHook,
    ) -> mediagrab::utils::error::Result<()> {
        hook.on_progress(TransferProgress {
            percent: 10.0,
            speed: "1.00MiB/s".to_string(),
            eta: "00:30".to_string(),
        });
        panic!("unexpected extractor state");
    }
}

struct Fixture {
    dir: TempDir,
    store: Arc<ConfigStore>,
}

/// Config with a real (empty) encoder file and output under the temp dir
fn fixture(with_encoder: bool) -> Fixture {
    let dir = tempdir().expect("Failed to create temp dir");
    let encoder = dir.path().join("ffmpeg");
    if with_encoder {
        std::fs::write(&encoder, b"").unwrap();
    }

    let store =
        ConfigStore::open_with_finder(dir.path().join("config.json"), || None).unwrap();
    let mut config = store.snapshot();
    config.system_settings.ffmpeg_path = encoder;
    config.system_settings.output_directory = dir.path().join("out");
    store.update(config).unwrap();

    Fixture {
        dir,
        store: Arc::new(store),
    }
}

fn collect(rx: &mut mediagrab::backend::messages::EventReceiver) -> Vec<BackendEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn logs(events: &[BackendEvent], level: LogLevel) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            BackendEvent::Log(entry) if entry.level == level => Some(entry.message.clone()),
            _ => None,
        })
        .collect()
}

fn last_progress(events: &[BackendEvent]) -> Option<(f32, String)> {
    events.iter().rev().find_map(|e| match e {
        BackendEvent::Progress {
            percent, status, ..
        } => Some((*percent, status.clone())),
        _ => None,
    })
}

#[tokio::test]
async fn test_successful_task_reports_done() {
    let fx = fixture(true);
    let extractor = Arc::new(ScriptedExtractor::succeeding());
    let (events, mut rx) = event_channel();
    let dispatcher = Dispatcher::new(
        Handle::current(),
        Arc::clone(&fx.store),
        extractor.clone(),
        events,
    );

    let handle = dispatcher
        .spawn_task(DownloadRequest::new("https://youtu.be/abc", DownloadMode::Audio))
        .unwrap();
    let id = handle.id().to_string();
    assert_eq!(handle.wait().await, TaskState::Succeeded);

    let events = collect(&mut rx);
    assert_eq!(logs(&events, LogLevel::Success).len(), 1);
    assert!(logs(&events, LogLevel::Error).is_empty());
    assert_eq!(logs(&events, LogLevel::Warn), vec!["Warning: slow connection"]);
    assert_eq!(last_progress(&events), Some((100.0, "Done".to_string())));
    assert!(events.iter().any(|e| matches!(
        e,
        BackendEvent::Progress { task_id, percent, status }
            if *task_id == id && *percent == 42.0 && status == "2.00MiB/s | ETA 00:05"
    )));

    // Options were built from the snapshot and the mode folder exists
    let seen = extractor.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "https://youtu.be/abc");
    let audio_dir = fx.dir.path().join("out").join("Audio");
    assert_eq!(seen[0].1.output_dir, audio_dir);
    assert!(audio_dir.is_dir());
}

#[tokio::test]
async fn test_failed_task_logs_exactly_one_error() {
    let fx = fixture(true);
    let (events, mut rx) = event_channel();
    let dispatcher = Dispatcher::new(
        Handle::current(),
        Arc::clone(&fx.store),
        Arc::new(ScriptedExtractor::failing("Video unavailable")),
        events,
    );

    let handle = dispatcher
        .spawn_task(DownloadRequest::new("https://youtu.be/gone", DownloadMode::Video))
        .unwrap();
    assert_eq!(handle.wait().await, TaskState::Failed);

    let events = collect(&mut rx);
    let errors = logs(&events, LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Video unavailable"));
    assert!(logs(&events, LogLevel::Success).is_empty());
    assert_eq!(last_progress(&events), Some((0.0, "Error".to_string())));

    let states: Vec<TaskState> = events
        .iter()
        .filter_map(|e| match e {
            BackendEvent::TaskState { state, .. } => Some(*state),
            _ => None,
        })
        .collect();
    assert_eq!(states.last(), Some(&TaskState::Failed));
}

#[tokio::test]
async fn test_missing_encoder_refuses_to_start() {
    let fx = fixture(false);
    let extractor = Arc::new(ScriptedExtractor::succeeding());
    let (events, mut rx) = event_channel();
    let dispatcher = Dispatcher::new(
        Handle::current(),
        Arc::clone(&fx.store),
        extractor.clone(),
        events,
    );

    let result = dispatcher.start_task(DownloadRequest::new(
        "https://youtu.be/abc",
        DownloadMode::Video,
    ));
    assert!(matches!(result, Err(MediaGrabError::EncoderNotFound(_))));

    let events = collect(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(logs(&events, LogLevel::Error).len(), 1);
    assert!(extractor.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_live_mode_warns_and_records_from_start() {
    let fx = fixture(true);
    let extractor = Arc::new(ScriptedExtractor::succeeding());
    let (events, mut rx) = event_channel();
    let dispatcher = Dispatcher::new(
        Handle::current(),
        Arc::clone(&fx.store),
        extractor.clone(),
        events,
    );

    let mut request =
        DownloadRequest::new("https://www.twitch.tv/somechannel", DownloadMode::Video);
    request.live_mode = true;
    let handle = dispatcher.spawn_task(request).unwrap();
    handle.wait().await;

    let events = collect(&mut rx);
    assert!(logs(&events, LogLevel::Warn)
        .iter()
        .any(|m| m.starts_with("Live mode")));
    let seen = extractor.seen.lock().unwrap();
    assert!(seen[0].1.live_from_start);
    assert!(!seen[0].1.write_thumbnail);
}

#[tokio::test]
async fn test_tasks_use_config_snapshot_taken_at_start() {
    let fx = fixture(true);
    let extractor = Arc::new(ScriptedExtractor::succeeding());
    let (events, _rx) = event_channel();
    let dispatcher = Dispatcher::new(
        Handle::current(),
        Arc::clone(&fx.store),
        extractor.clone(),
        events,
    );

    let first = dispatcher
        .spawn_task(DownloadRequest::new("https://youtu.be/one", DownloadMode::Metadata))
        .unwrap();

    let mut config = fx.store.snapshot();
    config.system_settings.output_directory = fx.dir.path().join("elsewhere");
    fx.store.update(config).unwrap();

    let second = dispatcher
        .spawn_task(DownloadRequest::new("https://youtu.be/two", DownloadMode::Metadata))
        .unwrap();
    assert_ne!(first.id(), second.id());
    first.wait().await;
    second.wait().await;

    let seen = extractor.seen.lock().unwrap();
    let dir_for = |url: &str| {
        seen.iter()
            .find(|(u, _)| u == url)
            .map(|(_, o)| o.output_dir.clone())
            .unwrap()
    };
    assert!(dir_for("https://youtu.be/one").starts_with(fx.dir.path().join("out")));
    assert!(dir_for("https://youtu.be/two").starts_with(fx.dir.path().join("elsewhere")));
}

#[tokio::test]
async fn test_panicking_extractor_still_ends_in_failure() {
    let fx = fixture(true);
    let (events, mut rx) = event_channel();
    let dispatcher = Dispatcher::new(
        Handle::current(),
        Arc::clone(&fx.store),
        Arc::new(PanickingExtractor),
        events,
    );

    let handle = dispatcher
        .spawn_task(DownloadRequest::new("https://youtu.be/boom", DownloadMode::Video))
        .unwrap();
    let id = handle.id().to_string();
    assert_eq!(handle.wait().await, TaskState::Failed);

    let events = collect(&mut rx);
    assert_eq!(logs(&events, LogLevel::Error).len(), 1);
    assert!(logs(&events, LogLevel::Success).is_empty());
    assert_eq!(last_progress(&events), Some((0.0, "Error".to_string())));
    assert_eq!(
        events.last(),
        Some(&BackendEvent::TaskState {
            task_id: id,
            state: TaskState::Failed
        })
    );
}
