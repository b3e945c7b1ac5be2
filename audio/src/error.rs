use thiserror::Error;

/// Errors returned by audio encoding operations.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("pcm data too large for a wav container: {0} bytes")]
    TooLarge(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
