use crate::downloader::progress::TaskState;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Identifier handed out for every started download
pub type TaskId = String;

/// Severity of a log line shown in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
        };
        f.write_str(label)
    }
}

/// A line for the UI log panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

/// Events sent from the backend to the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BackendEvent {
    Log(LogEntry),

    /// `percent` is 0..=100
    Progress {
        task_id: TaskId,
        percent: f32,
        status: String,
    },

    TaskState {
        task_id: TaskId,
        state: TaskState,
    },
}

/// Cloneable sending side of the event channel
///
/// Sends never block; a closed UI side is ignored (events are fire-and-forget).
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<BackendEvent>,
}

pub type EventReceiver = mpsc::UnboundedReceiver<BackendEvent>;

/// Create a connected sender/receiver pair
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

impl EventSender {
    pub fn send(&self, event: BackendEvent) {
        let _ = self.tx.send(event);
    }

    /// Append a line to the UI log (mirrored to tracing)
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info | LogLevel::Success => info!("[{}] {}", level, message),
            LogLevel::Warn => warn!("{}", message),
            LogLevel::Error => error!("{}", message),
        }
        self.send(BackendEvent::Log(LogEntry {
            timestamp: Local::now(),
            level,
            message,
        }));
    }

    pub fn progress(&self, task_id: &str, percent: f32, status: impl Into<String>) {
        self.send(BackendEvent::Progress {
            task_id: task_id.to_string(),
            percent: percent.clamp(0.0, 100.0),
            status: status.into(),
        });
    }

    pub fn task_state(&self, task_id: &str, state: TaskState) {
        self.send(BackendEvent::TaskState {
            task_id: task_id.to_string(),
            state,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_reaches_receiver() {
        let (sender, mut rx) = event_channel();
        sender.log(LogLevel::Warn, "careful");
        match rx.try_recv().unwrap() {
            BackendEvent::Log(entry) => {
                assert_eq!(entry.level, LogLevel::Warn);
                assert_eq!(entry.message, "careful");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        let (sender, mut rx) = event_channel();
        sender.progress("t1", 140.0, "x");
        assert!(matches!(
            rx.try_recv().unwrap(),
            BackendEvent::Progress { percent, .. } if percent == 100.0
        ));
    }

    #[test]
    fn test_send_after_receiver_dropped_is_ignored() {
        let (sender, rx) = event_channel();
        drop(rx);
        sender.log(LogLevel::Info, "nobody listens");
    }
}
