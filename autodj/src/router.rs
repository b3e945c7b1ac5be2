//! Routing of recognizer results to playback actions.

use crate::SoundCatalog;
use moodbox_mood::Mood;
use moodbox_recognizer::Recognition;
use serde::{Deserialize, Serialize};

/// Confidence thresholds for acting on a recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Minimum confidence for a `STOP` intent (default: 0.65).
    pub stop_confidence: f32,
    /// Minimum confidence for a mood request (default: 0.70).
    pub mood_confidence: f32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            stop_confidence: 0.65,
            mood_confidence: 0.70,
        }
    }
}

/// What to do with a recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Stop playback and play the stop cue. Never subject to admission.
    Stop,
    /// Play a sound for the mood if admission allows it.
    Admit(Mood),
    Ignore,
}

/// Maps a recognition to a [`Route`].
pub fn route(config: &RouterConfig, result: &Recognition, catalog: &SoundCatalog) -> Route {
    if result.is_stop() && result.confidence >= config.stop_confidence {
        return Route::Stop;
    }
    match result.mood() {
        Some(mood) if result.confidence >= config.mood_confidence && catalog.has_sounds(mood) => {
            Route::Admit(mood)
        }
        _ => Route::Ignore,
    }
}
