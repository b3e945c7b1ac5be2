//! Per-speaker audio accumulation for recognition.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Chunking and rate-limit parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Flush a chunk once it is older than this during continued speech
    /// (default: 2500).
    pub max_chunk_ms: u64,
    /// Chunks smaller than this are never dispatched (default: 150000,
    /// about 0.8s of 48kHz stereo).
    pub min_chunk_bytes: usize,
    /// Minimum time between two dispatches for one speaker (default: 3000).
    pub speaker_cooldown_ms: u64,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_ms: 2500,
            min_chunk_bytes: 150_000,
            speaker_cooldown_ms: 3000,
        }
    }
}

impl ChunkConfig {
    pub fn max_chunk(&self) -> Duration {
        Duration::from_millis(self.max_chunk_ms)
    }

    pub fn speaker_cooldown(&self) -> Duration {
        Duration::from_millis(self.speaker_cooldown_ms)
    }
}

/// Raw PCM captured for one speaker since the last flush.
#[derive(Debug, Clone, Default)]
pub struct ChunkBuffer {
    data: Vec<u8>,
    started_at: Option<Instant>,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a frame. The first frame after a flush starts the chunk clock.
    pub fn push(&mut self, frame: &[u8], now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        self.data.extend_from_slice(frame);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Reports whether the chunk is older than `max`.
    pub fn is_due(&self, now: Instant, max: Duration) -> bool {
        self.started_at
            .is_some_and(|at| now.saturating_duration_since(at) > max)
    }

    /// Removes and returns the buffered audio, starting a fresh chunk.
    pub fn take(&mut self) -> Vec<u8> {
        self.started_at = None;
        std::mem::take(&mut self.data)
    }

    /// Drops the buffered audio.
    pub fn clear(&mut self) {
        self.started_at = None;
        self.data.clear();
    }
}
