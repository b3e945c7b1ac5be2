//! Session queue events and status types.

use bytes::Bytes;
use moodbox_mood::{Features, Mood};
use moodbox_recognizer::Recognition;
use serde::Serialize;
use tokio::sync::oneshot;

/// Everything a session reacts to. Events for one session are handled one
/// at a time, in order.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    SpeechStart {
        speaker: String,
    },
    Frame {
        speaker: String,
        frame: Bytes,
    },
    SpeechEnd {
        speaker: String,
    },
    StreamError {
        speaker: String,
        error: String,
    },
    /// Debounced teardown of a speaker stream.
    Teardown {
        speaker: String,
        seq: u64,
    },
    RecognitionDone {
        speaker: String,
        result: Option<Recognition>,
    },
    SetAutoDj(bool),
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session: String,
    pub confirmed: Mood,
    pub candidate: Mood,
    pub features: Features,
    pub speakers: usize,
    pub recognition_busy: bool,
    pub autodj_enabled: bool,
    pub pending_autoplay: Option<Mood>,
}
