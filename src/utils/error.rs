//! Error handling for mediagrab

use thiserror::Error;

/// Main error type for mediagrab
#[derive(Debug, Error)]
pub enum MediaGrabError {
    #[error("FFmpeg not found at '{0}'. Set the encoder path in Settings")]
    EncoderNotFound(String),

    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("{0}")]
    ExtractionError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

pub type Result<T, E = MediaGrabError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_error_keeps_raw_message() {
        let err = MediaGrabError::ExtractionError("ERROR: Unsupported URL".to_string());
        assert_eq!(err.to_string(), "ERROR: Unsupported URL");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MediaGrabError = io.into();
        assert!(matches!(err, MediaGrabError::IoError(_)));
    }
}
