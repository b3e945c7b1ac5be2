//! Speaker stream registry.

use moodbox_audio::LoudnessMeter;
use moodbox_mood::SpeakerLevel;
use moodbox_recognizer::ChunkBuffer;
use std::collections::HashMap;
use std::time::Instant;

/// Capture state of one currently speaking participant.
#[derive(Debug)]
pub struct SpeakerStream {
    meter: LoudnessMeter,
    chunk: ChunkBuffer,
}

impl SpeakerStream {
    fn new(alpha: f32) -> Self {
        Self {
            meter: LoudnessMeter::new(alpha),
            chunk: ChunkBuffer::new(),
        }
    }

    /// Measures a frame and appends it to the recognition chunk.
    pub fn ingest(&mut self, frame: &[u8], now: Instant) -> f32 {
        self.chunk.push(frame, now);
        self.meter.observe(frame, now)
    }

    pub fn level(&self) -> SpeakerLevel {
        SpeakerLevel {
            loudness: self.meter.loudness(),
            last_frame_at: self.meter.last_frame_at(),
        }
    }

    pub fn chunk(&self) -> &ChunkBuffer {
        &self.chunk
    }

    pub fn chunk_mut(&mut self) -> &mut ChunkBuffer {
        &mut self.chunk
    }
}

/// Streams of one session, keyed by speaker id.
#[derive(Debug)]
pub struct SpeakerRegistry {
    alpha: f32,
    streams: HashMap<String, SpeakerStream>,
}

impl SpeakerRegistry {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            streams: HashMap::new(),
        }
    }

    /// Creates a stream for `id` unless one exists. Returns true when a new
    /// stream was created.
    pub fn open(&mut self, id: &str) -> bool {
        if self.streams.contains_key(id) {
            return false;
        }
        self.streams
            .insert(id.to_string(), SpeakerStream::new(self.alpha));
        true
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SpeakerStream> {
        self.streams.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.streams.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<SpeakerStream> {
        self.streams.remove(id)
    }

    pub fn levels(&self) -> Vec<SpeakerLevel> {
        self.streams.values().map(SpeakerStream::level).collect()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn clear(&mut self) {
        self.streams.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodbox_audio::pcm::to_bytes;

    #[test]
    fn test_open_is_idempotent() {
        let mut reg = SpeakerRegistry::new(0.35);
        assert!(reg.open("alice"));
        assert!(!reg.open("alice"));
        assert_eq!(reg.len(), 1);
        assert!(reg.remove("alice").is_some());
        assert!(reg.remove("alice").is_none());
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn test_ingest_updates_level_and_chunk() {
        let mut reg = SpeakerRegistry::new(0.5);
        let now = Instant::now();
        reg.open("bob");

        let frame = to_bytes(&[8192i16; 1920]);
        let stream = reg.get_mut("bob").unwrap();
        let rms = stream.ingest(&frame, now);
        assert!((rms - 0.25).abs() < 1e-6);
        assert!((stream.level().loudness - 0.125).abs() < 1e-6);
        assert_eq!(stream.chunk().len(), frame.len());

        let levels = reg.levels();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].last_frame_at, Some(now));
    }
}
