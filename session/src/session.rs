//! Per-session event loop.

use crate::event::{SessionEvent, SessionSnapshot};
use crate::port::{PlaybackSink, Sound};
use crate::speaker::SpeakerRegistry;
use crate::timers::DebounceTimers;
use crate::Config;
use moodbox_autodj::{
    evaluate, route, AdmissionInput, CooldownLedger, Decision, Route, SoundCatalog,
};
use moodbox_mood::{Mood, SessionMood};
use moodbox_recognizer::{dispatch, Blocked, ChunkBuffer, DispatchGates, Recognition, Recognizer};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Current time on the tokio clock.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Shared collaborators of every session.
#[derive(Clone)]
pub(crate) struct Shared {
    pub config: Arc<Config>,
    pub catalog: Arc<SoundCatalog>,
    pub recognizer: Option<Arc<dyn Recognizer>>,
}

/// State owned by one session's event loop.
pub(crate) struct SessionActor {
    id: String,
    shared: Shared,
    sink: Arc<dyn PlaybackSink>,
    tx: mpsc::WeakUnboundedSender<SessionEvent>,
    cancel: CancellationToken,

    mood: SessionMood,
    speakers: SpeakerRegistry,
    timers: DebounceTimers,
    ledger: CooldownLedger,
    gates: DispatchGates,
    /// Audio of closed streams whose final flush was blocked by the
    /// speaker cooldown or the busy flag.
    held: HashMap<String, ChunkBuffer>,
    pending_autoplay: Option<Mood>,
}

impl SessionActor {
    pub fn new(
        id: String,
        shared: Shared,
        sink: Arc<dyn PlaybackSink>,
        tx: mpsc::WeakUnboundedSender<SessionEvent>,
        cancel: CancellationToken,
    ) -> Self {
        let config = shared.config.clone();
        Self {
            id,
            mood: SessionMood::new(&config.mood, now()),
            speakers: SpeakerRegistry::new(config.speaker.loudness_alpha),
            timers: DebounceTimers::new(),
            ledger: CooldownLedger::new(),
            gates: DispatchGates::new(config.chunk.clone()),
            held: HashMap::new(),
            pending_autoplay: None,
            shared,
            sink,
            tx,
            cancel,
        }
    }

    /// Runs until the session is cancelled or every handle is dropped.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SessionEvent>) {
        let mut ticker = tokio::time::interval(self.shared.config.mood.aggregator.tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(session = %self.id, "session started");

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                event = rx.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
                _ = ticker.tick() => self.on_tick().await,
            }
        }

        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel.cancel();
        self.timers.cancel_all();
        self.speakers.clear();
        self.held.clear();
        self.pending_autoplay = None;
        info!(session = %self.id, "session ended");
    }

    async fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SpeechStart { speaker } => self.on_speech_start(&speaker),
            SessionEvent::Frame { speaker, frame } => self.on_frame(&speaker, &frame),
            SessionEvent::SpeechEnd { speaker } => self.on_speech_end(&speaker),
            SessionEvent::StreamError { speaker, error } => {
                warn!(session = %self.id, %speaker, %error, "speaker stream error");
                self.timers.cancel(&speaker);
                self.teardown(&speaker);
            }
            SessionEvent::Teardown { speaker, seq } => {
                if self.timers.fire(&speaker, seq) {
                    self.teardown(&speaker);
                }
            }
            SessionEvent::RecognitionDone { speaker, result } => {
                self.gates.release();
                self.flush_held();
                if let Some(result) = result {
                    self.on_recognition(&speaker, result).await;
                }
            }
            SessionEvent::SetAutoDj(enabled) => {
                self.ledger.set_enabled(enabled);
                if !enabled {
                    self.pending_autoplay = None;
                }
                info!(session = %self.id, enabled, "autodj toggled");
            }
            SessionEvent::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn on_speech_start(&mut self, speaker: &str) {
        let resumed = self.timers.cancel(speaker);
        if self.speakers.open(speaker) {
            self.mood.note_turn_start();
            if let Some(held) = self.held.remove(speaker) {
                if let Some(stream) = self.speakers.get_mut(speaker) {
                    *stream.chunk_mut() = held;
                }
            }
            debug!(session = %self.id, %speaker, "speaker stream opened");
        } else if resumed {
            debug!(session = %self.id, %speaker, "speaker stream resumed");
        }
    }

    fn on_frame(&mut self, speaker: &str, frame: &[u8]) {
        let now = now();
        let max_chunk = self.gates.config().max_chunk();
        let Some(stream) = self.speakers.get_mut(speaker) else {
            return;
        };
        stream.ingest(frame, now);
        if stream.chunk().is_due(now, max_chunk) {
            self.flush(speaker, false);
        }
    }

    fn on_speech_end(&mut self, speaker: &str) {
        if !self.speakers.contains(speaker) {
            return;
        }
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        let delay = self.shared.config.speaker.debounce();
        let speaker_id = speaker.to_string();
        self.timers
            .schedule(speaker, delay, tx, move |seq| SessionEvent::Teardown {
                speaker: speaker_id,
                seq,
            });
    }

    /// Removes a stream after one final flush of its buffered audio.
    fn teardown(&mut self, speaker: &str) {
        if !self.speakers.contains(speaker) {
            return;
        }
        self.flush(speaker, true);
        self.speakers.remove(speaker);
        debug!(session = %self.id, %speaker, "speaker stream closed");
    }

    /// Tries to send the speaker's chunk to the recognizer.
    ///
    /// During speech a blocked chunk keeps accumulating and is retried on
    /// the next frame. On the final flush a chunk below the minimum size is
    /// dropped, and one blocked by cooldown or the busy flag is held until
    /// the gates open.
    fn flush(&mut self, speaker: &str, last: bool) {
        let now = now();
        let Some(stream) = self.speakers.get_mut(speaker) else {
            return;
        };
        if self.shared.recognizer.is_none() {
            stream.chunk_mut().clear();
            return;
        }
        let bytes = stream.chunk().len();

        match self.gates.try_acquire(speaker, bytes, now) {
            Ok(()) => {
                let pcm = stream.chunk_mut().take();
                self.spawn_recognition(speaker, pcm);
            }
            Err(_) if !last => {}
            Err(Blocked::TooSmall) => {
                debug!(session = %self.id, %speaker, bytes, "recognition chunk too small");
                stream.chunk_mut().clear();
            }
            Err(reason) => {
                debug!(session = %self.id, %speaker, bytes, %reason, "recognition chunk held");
                let chunk = std::mem::take(stream.chunk_mut());
                self.held.insert(speaker.to_string(), chunk);
            }
        }
    }

    /// Dispatches one held chunk whose gates are open.
    fn flush_held(&mut self) {
        if self.held.is_empty() || self.gates.is_busy() {
            return;
        }
        let now = now();
        let ready = self
            .held
            .iter()
            .find(|(speaker, chunk)| self.gates.check(speaker, chunk.len(), now).is_ok())
            .map(|(speaker, _)| speaker.clone());
        let Some(speaker) = ready else {
            return;
        };
        let Some(mut chunk) = self.held.remove(&speaker) else {
            return;
        };
        if self.gates.try_acquire(&speaker, chunk.len(), now).is_ok() {
            self.spawn_recognition(&speaker, chunk.take());
        }
    }

    fn spawn_recognition(&mut self, speaker: &str, pcm: Vec<u8>) {
        let (Some(tx), Some(recognizer)) = (self.tx.upgrade(), self.shared.recognizer.clone()) else {
            self.gates.release();
            return;
        };
        let format = self.shared.config.session.format;
        let token = self.cancel.child_token();
        let speaker = speaker.to_string();
        debug!(session = %self.id, %speaker, bytes = pcm.len(), "recognition dispatched");

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = dispatch(recognizer.as_ref(), &pcm, format) => result,
            };
            let _ = tx.send(SessionEvent::RecognitionDone { speaker, result });
        });
    }

    async fn on_recognition(&mut self, speaker: &str, result: Recognition) {
        let config = self.shared.config.clone();
        match route(&config.router, &result, &self.shared.catalog) {
            Route::Stop => {
                info!(session = %self.id, %speaker, text = %result.text, "stop requested");
                self.stop().await;
            }
            Route::Admit(mood) => {
                let now = now();
                match self.admit(mood, now) {
                    Decision::Allow => {
                        self.play(mood, now).await;
                    }
                    Decision::Deny(reason) => {
                        debug!(session = %self.id, %speaker, %mood, %reason, "recognized mood denied");
                    }
                }
            }
            Route::Ignore => {
                debug!(
                    session = %self.id,
                    %speaker,
                    intent = %result.intent,
                    mood = %result.mood,
                    confidence = result.confidence,
                    "recognition ignored"
                );
            }
        }
    }

    async fn on_tick(&mut self) {
        self.flush_held();

        let now = now();
        let out = self.mood.tick(now, self.speakers.levels());

        if let Some(c) = out.transition {
            info!(
                session = %self.id,
                from = %c.from,
                mood = %c.to,
                voice = out.features.ema_voice,
                energy = out.features.ema_energy,
                burst = out.features.burst_per_sec,
                "mood confirmed"
            );
            self.pending_autoplay = self.shared.catalog.has_sounds(c.to).then_some(c.to);
        }

        if let Some(mood) = self.pending_autoplay {
            self.autoplay(mood, now).await;
        }
    }

    /// Retries a pending automatic playback until it starts or a
    /// non-transient denial clears it.
    async fn autoplay(&mut self, mood: Mood, now: Instant) {
        if self.mood.confirmed() != mood {
            self.pending_autoplay = None;
            return;
        }
        match self.admit(mood, now) {
            Decision::Allow => {
                self.pending_autoplay = None;
                self.play(mood, now).await;
            }
            Decision::Deny(reason) if reason.is_transient() => {}
            Decision::Deny(reason) => {
                debug!(session = %self.id, %mood, %reason, "autoplay cancelled");
                self.pending_autoplay = None;
            }
        }
    }

    fn admit(&self, mood: Mood, now: Instant) -> Decision {
        let input = AdmissionInput {
            mood,
            now,
            enabled: self.ledger.is_enabled(),
            connected: self.sink.is_connected(),
            playing: self.sink.is_playing(),
            last_voice_activity: self.mood.last_voice_activity(),
            last_global_play: self.ledger.last_global_play(),
            last_mood_play: self.ledger.last_mood_play(mood),
            energy: self.mood.features().ema_energy,
        };
        evaluate(&self.shared.config.admission, &input)
    }

    /// Plays a random sound for `mood` and records it on success.
    async fn play(&mut self, mood: Mood, now: Instant) {
        let Some(path) = self.shared.catalog.pick_random(mood) else {
            debug!(session = %self.id, %mood, "no sounds");
            return;
        };
        let sound = match Sound::open(path) {
            Ok(sound) => sound,
            Err(e) => {
                warn!(session = %self.id, %mood, error = %e, "failed to open sound");
                return;
            }
        };
        let path = path.display().to_string();
        match self.sink.play(sound, self.shared.config.session.gain()).await {
            Ok(()) => {
                self.ledger.record_play(mood, now);
                info!(session = %self.id, %mood, sound = %path, "playing");
            }
            Err(e) => {
                warn!(session = %self.id, %mood, sound = %path, error = %e, "playback failed");
            }
        }
    }

    /// Stops playback and plays the stop cue, bypassing admission.
    async fn stop(&mut self) {
        self.pending_autoplay = None;
        self.sink.stop().await;

        let Some(path) = self.shared.catalog.pick_random(Mood::Stop) else {
            return;
        };
        let result = match Sound::open(path) {
            Ok(sound) => self.sink.play(sound, self.shared.config.session.gain()).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(session = %self.id, sound = %path.display(), error = %e, "stop cue failed");
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session: self.id.clone(),
            confirmed: self.mood.confirmed(),
            candidate: self.mood.candidate(),
            features: self.mood.features(),
            speakers: self.speakers.len(),
            recognition_busy: self.gates.is_busy(),
            autodj_enabled: self.ledger.is_enabled(),
            pending_autoplay: self.pending_autoplay,
        }
    }
}
