//! Starts downloads as independent background tasks

use crate::backend::messages::{EventSender, LogLevel, TaskId};
use crate::downloader::progress::{TaskReporter, TaskState};
use crate::extractor::options::{build_options, DownloadRequest};
use crate::extractor::traits::MediaExtractor;
use crate::utils::config::{AppConfig, ConfigStore};
use crate::utils::error::{MediaGrabError, Result};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Spawns one worker per download request
///
/// There is no queue and no concurrency cap. Workers read the config
/// snapshot taken when they were started, so later settings changes do not
/// affect them.
#[derive(Clone)]
pub struct Dispatcher {
    runtime: Handle,
    config: Arc<ConfigStore>,
    extractor: Arc<dyn MediaExtractor>,
    events: EventSender,
}

/// A started download
#[derive(Debug)]
pub struct DownloadHandle {
    id: TaskId,
    join: JoinHandle<TaskState>,
}

impl DownloadHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the terminal state. Dropping the handle does not cancel the task.
    pub async fn wait(self) -> TaskState {
        match self.join.await {
            Ok(state) => state,
            Err(e) => {
                debug!("Task {} worker did not finish: {}", self.id, e);
                TaskState::Failed
            }
        }
    }
}

impl Dispatcher {
    pub fn new(
        runtime: Handle,
        config: Arc<ConfigStore>,
        extractor: Arc<dyn MediaExtractor>,
        events: EventSender,
    ) -> Self {
        Self {
            runtime,
            config,
            extractor,
            events,
        }
    }

    pub fn events(&self) -> &EventSender {
        &self.events
    }

    pub fn extractor(&self) -> &Arc<dyn MediaExtractor> {
        &self.extractor
    }

    /// Start a download and return its id immediately
    pub fn start_task(&self, request: DownloadRequest) -> Result<TaskId> {
        self.spawn_task(request).map(|handle| handle.id)
    }

    /// Like [`Dispatcher::start_task`] but keeps the handle so the caller can wait
    pub fn spawn_task(&self, request: DownloadRequest) -> Result<DownloadHandle> {
        let config = self.config.snapshot();

        if let Err(e) = check_encoder(&config) {
            self.events.log(LogLevel::Error, e.to_string());
            return Err(e);
        }

        let id = Uuid::new_v4().to_string();
        info!("Dispatching task {} for {}", id, request.url);

        let reporter = TaskReporter::new(id.clone(), self.events.clone());
        let worker = run_task(
            request,
            config,
            Arc::clone(&self.extractor),
            self.events.clone(),
            reporter,
        );
        let worker = self.runtime.spawn(worker);
        let join = self
            .runtime
            .spawn(supervise(id.clone(), worker, self.events.clone()));

        Ok(DownloadHandle { id, join })
    }
}

/// The encoder must be configured and present before anything is spawned
fn check_encoder(config: &AppConfig) -> Result<()> {
    let path = &config.system_settings.ffmpeg_path;
    if path.as_os_str().is_empty() || !path.exists() {
        return Err(MediaGrabError::EncoderNotFound(path.display().to_string()));
    }
    Ok(())
}

/// Turn a worker that died without a terminal state into a failed task
async fn supervise(
    task_id: TaskId,
    worker: JoinHandle<TaskState>,
    events: EventSender,
) -> TaskState {
    match worker.await {
        Ok(state) => state,
        Err(e) => {
            let reason = if e.is_panic() {
                "worker panicked"
            } else {
                "worker was cancelled"
            };
            events.log(LogLevel::Error, format!("Download failed: {}", reason));
            events.progress(&task_id, 0.0, "Error");
            events.task_state(&task_id, TaskState::Failed);
            TaskState::Failed
        }
    }
}

async fn run_task(
    request: DownloadRequest,
    config: AppConfig,
    extractor: Arc<dyn MediaExtractor>,
    events: EventSender,
    mut reporter: TaskReporter,
) -> TaskState {
    let options = build_options(&request, &config);

    if let Err(e) = tokio::fs::create_dir_all(&options.output_dir).await {
        reporter.fail(&format!(
            "cannot create {}: {}",
            options.output_dir.display(),
            e
        ));
        return reporter.state();
    }

    events.log(
        LogLevel::Info,
        format!("Task started: {} [{}]", request.url, request.mode),
    );
    if request.live_mode {
        events.log(
            LogLevel::Warn,
            "Live mode enabled: recording from the start of the stream",
        );
    }

    match extractor.download(&request.url, &options, &mut reporter).await {
        Ok(()) => reporter.succeed(),
        Err(e) => {
            let message = match (&e, reporter.last_error()) {
                (MediaGrabError::ExtractionError(msg), _) => msg.clone(),
                (_, Some(line)) => format!("{} ({})", e, line),
                (_, None) => e.to_string(),
            };
            reporter.fail(&message);
        }
    }

    debug!(
        "Task {} finished as {}",
        reporter.task_id(),
        reporter.state().as_str()
    );
    reporter.state()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_check_encoder_rejects_empty_and_missing() {
        let mut config = AppConfig::default();
        config.system_settings.ffmpeg_path = PathBuf::new();
        assert!(matches!(
            check_encoder(&config),
            Err(MediaGrabError::EncoderNotFound(_))
        ));

        config.system_settings.ffmpeg_path = PathBuf::from("/definitely/not/here/ffmpeg");
        assert!(matches!(
            check_encoder(&config),
            Err(MediaGrabError::EncoderNotFound(p)) if p.contains("definitely")
        ));
    }

    #[tokio::test]
    async fn test_panicking_worker_reports_failure() {
        use crate::backend::messages::{event_channel, BackendEvent};

        let (events, mut rx) = event_channel();
        let worker: JoinHandle<TaskState> = tokio::spawn(async { panic!("extractor blew up") });

        let state = supervise("t-panic".to_string(), worker, events).await;
        assert_eq!(state, TaskState::Failed);

        let mut received = Vec::new();
        while let Ok(event) = rx.try_recv() {
            received.push(event);
        }
        assert!(matches!(
            &received[0],
            BackendEvent::Log(entry) if entry.level == LogLevel::Error
        ));
        assert!(received.iter().any(|e| matches!(
            e,
            BackendEvent::Progress { percent, status, .. } if *percent == 0.0 && status == "Error"
        )));
        assert_eq!(
            received.last(),
            Some(&BackendEvent::TaskState {
                task_id: "t-panic".to_string(),
                state: TaskState::Failed
            })
        );
    }

    #[test]
    fn test_check_encoder_accepts_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = dir.path().join("ffmpeg");
        std::fs::write(&encoder, b"").unwrap();

        let mut config = AppConfig::default();
        config.system_settings.ffmpeg_path = encoder;
        assert!(check_encoder(&config).is_ok());
    }
}
