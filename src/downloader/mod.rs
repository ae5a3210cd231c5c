//! Download dispatch: one background task per request

pub mod dispatcher;
pub mod progress;

// Re-export for convenience
pub use dispatcher::{Dispatcher, DownloadHandle};
pub use progress::{TaskReporter, TaskState};
