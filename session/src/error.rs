use std::path::PathBuf;
use thiserror::Error;

/// Errors returned when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine config path")]
    NoPath,

    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors returned by a playback sink.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no audio output connection")]
    NotConnected,

    #[error("open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("playback failed: {0}")]
    Other(String),
}
