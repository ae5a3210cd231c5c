//! Per-task progress tracking

use crate::backend::messages::{EventSender, LogLevel, TaskId};
use crate::extractor::traits::{ProgressHook, TransferProgress};
use serde::Serialize;
use tracing::{debug, warn};

/// Status text shown once the raw transfer is over
pub const PROCESSING_MESSAGE: &str = "Download finished, processing conversion and metadata...";

/// Lifecycle of one download task
///
/// `Started -> Downloading -> Finalizing -> Succeeded | Failed`. Any
/// non-terminal state may fail. `Finalizing -> Downloading` happens when
/// video and audio streams are fetched one after the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskState {
    Started,
    Downloading,
    Finalizing,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }

    pub fn can_transition_to(&self, next: TaskState) -> bool {
        use TaskState::*;

        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (_, Failed)
                | (Started, Downloading)
                | (Started, Finalizing)
                | (Downloading, Finalizing)
                | (Finalizing, Downloading)
                | (Finalizing, Succeeded)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Started => "Started",
            TaskState::Downloading => "Downloading",
            TaskState::Finalizing => "Finalizing",
            TaskState::Succeeded => "Succeeded",
            TaskState::Failed => "Failed",
        }
    }
}

/// Relays extractor callbacks for one task onto the event channel
#[derive(Debug)]
pub struct TaskReporter {
    task_id: TaskId,
    state: TaskState,
    events: EventSender,
    last_error: Option<String>,
}

impl TaskReporter {
    /// Register a new task; emits the `Started` state
    pub fn new(task_id: TaskId, events: EventSender) -> Self {
        events.task_state(&task_id, TaskState::Started);
        Self {
            task_id,
            state: TaskState::Started,
            events,
            last_error: None,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Last error line the extractor reported, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Move to `next`; returns false (and changes nothing) if that is not allowed
    fn transition(&mut self, next: TaskState) -> bool {
        if !self.state.can_transition_to(next) {
            debug!(
                "Task {}: ignoring transition {} -> {}",
                self.task_id,
                self.state.as_str(),
                next.as_str()
            );
            return false;
        }
        self.state = next;
        self.events.task_state(&self.task_id, next);
        true
    }

    /// Terminal success: one success log line, progress at 100
    pub fn succeed(&mut self) {
        if self.state != TaskState::Finalizing {
            self.transition(TaskState::Finalizing);
        }
        if self.transition(TaskState::Succeeded) {
            self.events.log(LogLevel::Success, "Task completed successfully!");
            self.events.progress(&self.task_id, 100.0, "Done");
        }
    }

    /// Terminal failure: one error log line with the raw message, progress reset
    pub fn fail(&mut self, message: &str) {
        if self.transition(TaskState::Failed) {
            self.events
                .log(LogLevel::Error, format!("Download failed: {}", message));
            self.events.progress(&self.task_id, 0.0, "Error");
        } else {
            warn!("Task {} already finished, dropping failure: {}", self.task_id, message);
        }
    }
}

impl ProgressHook for TaskReporter {
    fn on_progress(&mut self, progress: TransferProgress) {
        if self.state.is_terminal() {
            return;
        }
        if self.state != TaskState::Downloading {
            self.transition(TaskState::Downloading);
        }
        let status = format!("{} | ETA {}", progress.speed, progress.eta);
        self.events.progress(&self.task_id, progress.percent, status);
    }

    fn on_finished(&mut self) {
        if self.state != TaskState::Finalizing && self.transition(TaskState::Finalizing) {
            self.events
                .progress(&self.task_id, 100.0, PROCESSING_MESSAGE);
        }
    }

    fn on_warning(&mut self, message: &str) {
        self.events.log(LogLevel::Warn, format!("Warning: {}", message));
    }

    fn on_error(&mut self, message: &str) {
        // Surfaced once through fail(), not as a separate log line
        debug!("Task {} extractor error: {}", self.task_id, message);
        self.last_error = Some(message.to_string());
    }
}
