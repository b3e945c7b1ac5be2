//! Audio output port.

use crate::PlaybackError;
use async_trait::async_trait;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// A sound ready for playback.
pub struct Sound {
    path: PathBuf,
    reader: Box<dyn Read + Send>,
}

impl Sound {
    pub fn new(path: impl Into<PathBuf>, reader: Box<dyn Read + Send>) -> Self {
        Self {
            path: path.into(),
            reader,
        }
    }

    /// Opens a sound file.
    pub fn open(path: &Path) -> Result<Self, PlaybackError> {
        let file = File::open(path).map_err(|source| PlaybackError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, Box::new(file)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.reader
    }
}

impl fmt::Debug for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sound").field("path", &self.path).finish()
    }
}

/// Audio output of one session.
#[async_trait]
pub trait PlaybackSink: Send + Sync {
    /// Reports whether an output connection is present.
    fn is_connected(&self) -> bool;

    /// Reports whether the output is currently playing.
    fn is_playing(&self) -> bool;

    /// Starts playing `sound` at linear `gain` in [0, 1], replacing
    /// anything already playing.
    async fn play(&self, sound: Sound, gain: f32) -> Result<(), PlaybackError>;

    /// Stops playback.
    async fn stop(&self);
}
