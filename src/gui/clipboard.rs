//! Clipboard access for the URL field

use arboard::Clipboard;

/// First line of the clipboard text, trimmed
pub fn paste_url() -> Result<String, String> {
    let mut clipboard =
        Clipboard::new().map_err(|e| format!("Failed to access clipboard: {}", e))?;

    let text = clipboard
        .get_text()
        .map_err(|e| format!("Failed to read clipboard: {}", e))?;

    first_line(&text).ok_or_else(|| "Clipboard is empty".to_string())
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
