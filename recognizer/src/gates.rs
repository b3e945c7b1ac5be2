//! Dispatch gating: minimum size, per-speaker cooldown, single flight.

use crate::ChunkConfig;
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// Why a chunk was not dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocked {
    TooSmall,
    Cooldown,
    Busy,
}

impl fmt::Display for Blocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Blocked::TooSmall => "too_small",
            Blocked::Cooldown => "cooldown",
            Blocked::Busy => "busy",
        })
    }
}

/// Recognition dispatch state of one session.
///
/// At most one dispatch is in flight per session. [`try_acquire`] sets the
/// busy flag and [`release`] clears it.
///
/// [`try_acquire`]: DispatchGates::try_acquire
/// [`release`]: DispatchGates::release
#[derive(Debug, Clone, Default)]
pub struct DispatchGates {
    config: ChunkConfig,
    busy: bool,
    last_dispatch: HashMap<String, Instant>,
}

impl DispatchGates {
    pub fn new(config: ChunkConfig) -> Self {
        Self {
            config,
            busy: false,
            last_dispatch: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn last_dispatch(&self, speaker: &str) -> Option<Instant> {
        self.last_dispatch.get(speaker).copied()
    }

    /// Checks the gates in order: size, speaker cooldown, busy flag.
    pub fn check(&self, speaker: &str, bytes: usize, now: Instant) -> Result<(), Blocked> {
        if bytes < self.config.min_chunk_bytes {
            return Err(Blocked::TooSmall);
        }
        if let Some(at) = self.last_dispatch(speaker) {
            if now.saturating_duration_since(at) < self.config.speaker_cooldown() {
                return Err(Blocked::Cooldown);
            }
        }
        if self.busy {
            return Err(Blocked::Busy);
        }
        Ok(())
    }

    /// Checks the gates and, when they pass, marks the session busy and
    /// stamps the speaker's dispatch time.
    pub fn try_acquire(&mut self, speaker: &str, bytes: usize, now: Instant) -> Result<(), Blocked> {
        self.check(speaker, bytes, now)?;
        self.busy = true;
        self.last_dispatch.insert(speaker.to_string(), now);
        Ok(())
    }

    /// Clears the busy flag.
    pub fn release(&mut self) {
        self.busy = false;
    }
}
