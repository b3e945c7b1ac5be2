//! Session registry and handles.

use crate::event::{SessionEvent, SessionSnapshot};
use crate::port::PlaybackSink;
use crate::session::{SessionActor, Shared};
use crate::Config;
use bytes::Bytes;
use moodbox_autodj::SoundCatalog;
use moodbox_recognizer::Recognizer;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a running session.
///
/// Every method only enqueues an event; none of them wait for the session
/// to process it, except [`snapshot`](Self::snapshot). Events sent after
/// the session ended are dropped.
#[derive(Clone)]
pub struct SessionHandle {
    id: Arc<str>,
    tx: mpsc::UnboundedSender<SessionEvent>,
    cancel: CancellationToken,
    done: CancellationToken,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    fn send(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            debug!(session = %self.id, "event for ended session dropped");
        }
    }

    pub fn speech_start(&self, speaker: impl Into<String>) {
        self.send(SessionEvent::SpeechStart {
            speaker: speaker.into(),
        });
    }

    /// Delivers one s16le frame for `speaker`.
    pub fn frame(&self, speaker: impl Into<String>, frame: impl Into<Bytes>) {
        self.send(SessionEvent::Frame {
            speaker: speaker.into(),
            frame: frame.into(),
        });
    }

    pub fn speech_end(&self, speaker: impl Into<String>) {
        self.send(SessionEvent::SpeechEnd {
            speaker: speaker.into(),
        });
    }

    /// Reports a failed frame stream. The speaker's stream is torn down.
    pub fn stream_error(&self, speaker: impl Into<String>, error: impl ToString) {
        self.send(SessionEvent::StreamError {
            speaker: speaker.into(),
            error: error.to_string(),
        });
    }

    pub fn set_autodj(&self, enabled: bool) {
        self.send(SessionEvent::SetAutoDj(enabled));
    }

    /// Returns the session's current state, or `None` once it has ended.
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(SessionEvent::Snapshot(tx)).ok()?;
        rx.await.ok()
    }

    /// Ends the session. Pending timers and in-flight recognition are
    /// cancelled.
    pub fn end(&self) {
        self.cancel.cancel();
    }

    /// Waits until the session's event loop has exited.
    pub async fn closed(&self) {
        self.done.cancelled().await;
    }

    pub fn is_closed(&self) -> bool {
        self.done.is_cancelled()
    }
}

type Registry = Arc<Mutex<HashMap<String, SessionHandle>>>;

/// Owns the shared collaborators and every running session.
///
/// A session leaves the registry when its event loop exits, however it
/// was ended.
pub struct Coordinator {
    shared: Shared,
    sessions: Registry,
}

impl Coordinator {
    /// Builds the catalog and recognizer from `config`.
    pub fn new(config: Config) -> Self {
        let catalog = config.catalog();
        let recognizer = config
            .recognizer
            .build()
            .map(|r| Arc::new(r) as Arc<dyn Recognizer>);
        Self::with_parts(config, catalog, recognizer)
    }

    pub fn with_parts(
        config: Config,
        catalog: SoundCatalog,
        recognizer: Option<Arc<dyn Recognizer>>,
    ) -> Self {
        Self {
            shared: Shared {
                config: Arc::new(config),
                catalog: Arc::new(catalog),
                recognizer,
            },
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn catalog(&self) -> &SoundCatalog {
        &self.shared.catalog
    }

    /// Starts a session playing into `sink`. An existing session with the
    /// same id is ended first.
    pub async fn start_session(&self, id: &str, sink: Arc<dyn PlaybackSink>) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let done = CancellationToken::new();

        let actor = SessionActor::new(
            id.to_string(),
            self.shared.clone(),
            sink,
            tx.downgrade(),
            cancel.clone(),
        );
        let finished = done.clone();
        let registry = self.sessions.clone();
        let key = id.to_string();
        tokio::spawn(async move {
            actor.run(rx).await;
            finished.cancel();
            // A replacement under the same id is still open.
            let mut sessions = registry.lock().await;
            if sessions.get(&key).is_some_and(SessionHandle::is_closed) {
                sessions.remove(&key);
            }
        });

        let handle = SessionHandle {
            id: Arc::from(id),
            tx,
            cancel,
            done,
        };
        if let Some(old) = self
            .sessions
            .lock()
            .await
            .insert(id.to_string(), handle.clone())
        {
            old.end();
        }
        handle
    }

    pub async fn session(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.lock().await.get(id).cloned()
    }

    /// Ends a session and waits for it to exit. Returns false for unknown ids.
    pub async fn end_session(&self, id: &str) -> bool {
        let Some(handle) = self.sessions.lock().await.remove(id) else {
            return false;
        };
        handle.end();
        handle.closed().await;
        true
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Ends every session.
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self.sessions.lock().await.drain().map(|(_, h)| h).collect();
        for handle in &handles {
            handle.end();
        }
        for handle in &handles {
            handle.closed().await;
        }
    }
}
