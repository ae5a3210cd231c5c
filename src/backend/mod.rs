pub mod bridge;
pub mod messages;

pub use bridge::UiBridge;
pub use messages::{event_channel, BackendEvent, EventSender, LogEntry, LogLevel, TaskId};
