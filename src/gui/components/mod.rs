//! GUI components

pub mod log_panel;
pub mod progress_bar;
pub mod url_input;

// Re-export for convenience
pub use log_panel::log_panel;
pub use progress_bar::progress_bar;
pub use url_input::url_input;
