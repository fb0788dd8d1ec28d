//! Error types for recording, persistence and playback

use crate::input::backend::BackendError;
use thiserror::Error;

/// Errors that can occur while recording or replaying macros
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Already recording")]
    AlreadyRecording,

    #[error("Not recording")]
    NotRecording,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid recording format: {0}")]
    InvalidRecordingFormat(String),

    #[error("Backend operation failed: {0}")]
    BackendOperation(#[from] BackendError),

    #[error("Macro not found: {0}")]
    MacroNotFound(String),

    #[error("Playback task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for recording operations
pub type RecordingResult<T> = Result<T, RecordingError>;

impl RecordingError {
    pub(crate) fn invalid_parameter(message: impl Into<String>) -> Self {
        RecordingError::InvalidParameter(message.into())
    }

    pub(crate) fn invalid_format(message: impl Into<String>) -> Self {
        RecordingError::InvalidRecordingFormat(message.into())
    }
}
