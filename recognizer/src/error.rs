use moodbox_audio::AudioError;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by recognizer invocations.
#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("no recognizer command configured")]
    NotConfigured,

    #[error("failed to start recognizer: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("recognizer timed out after {0:?}")]
    Timeout(Duration),

    #[error("recognizer exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
