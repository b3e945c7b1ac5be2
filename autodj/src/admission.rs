//! Playback admission control.
//!
//! [`evaluate`] decides whether an automatic playback of a mood may start
//! right now. It is a pure function: it reads a snapshot of session state
//! and never records anything. Checks run in a fixed order and the first
//! failing check is reported as the [`DenyReason`].

use moodbox_mood::Mood;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Configuration for [`evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Required quiet time since the last voiced tick (default: 900).
    pub min_silence_ms: u64,
    /// Minimum time between any two automatic plays (default: 12000).
    pub global_cooldown_ms: u64,
    /// Minimum time between two automatic plays of the same mood (default: 22000).
    pub mood_cooldown_ms: u64,
    /// Smoothed energy below which only `CALM` may play (default: 0.012).
    pub min_energy: f32,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            min_silence_ms: 900,
            global_cooldown_ms: 12_000,
            mood_cooldown_ms: 22_000,
            min_energy: 0.012,
        }
    }
}

impl AdmissionConfig {
    pub fn min_silence(&self) -> Duration {
        Duration::from_millis(self.min_silence_ms)
    }

    pub fn global_cooldown(&self) -> Duration {
        Duration::from_millis(self.global_cooldown_ms)
    }

    pub fn mood_cooldown(&self) -> Duration {
        Duration::from_millis(self.mood_cooldown_ms)
    }
}

/// Everything the admission check looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdmissionInput {
    pub mood: Mood,
    pub now: Instant,
    /// AutoDJ enabled for the session.
    pub enabled: bool,
    /// An audio output connection is present.
    pub connected: bool,
    /// The output is already playing.
    pub playing: bool,
    pub last_voice_activity: Option<Instant>,
    pub last_global_play: Option<Instant>,
    /// Last automatic play of `mood`.
    pub last_mood_play: Option<Instant>,
    /// Smoothed session energy.
    pub energy: f32,
}

/// Why a playback was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    ManualOnly,
    Disabled,
    NotConnected,
    Busy,
    NotSilent,
    GlobalCooldown,
    MoodCooldown,
    LowEnergy,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::ManualOnly => "manual_only",
            DenyReason::Disabled => "disabled",
            DenyReason::NotConnected => "not_connected",
            DenyReason::Busy => "busy",
            DenyReason::NotSilent => "not_silent",
            DenyReason::GlobalCooldown => "global_cooldown",
            DenyReason::MoodCooldown => "mood_cooldown",
            DenyReason::LowEnergy => "low_energy",
        }
    }

    /// Reports whether the condition may clear by itself as time passes.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DenyReason::NotConnected
                | DenyReason::Busy
                | DenyReason::NotSilent
                | DenyReason::GlobalCooldown
                | DenyReason::MoodCooldown
                | DenyReason::LowEnergy
        )
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// True when `since` is unset or at least `gap` before `now`.
fn elapsed_at_least(now: Instant, since: Option<Instant>, gap: Duration) -> bool {
    match since {
        Some(at) => now.saturating_duration_since(at) >= gap,
        None => true,
    }
}

/// Decides whether `input.mood` may be played automatically.
pub fn evaluate(config: &AdmissionConfig, input: &AdmissionInput) -> Decision {
    use DenyReason::*;

    let now = input.now;
    let deny = if input.mood.is_manual_only() {
        Some(ManualOnly)
    } else if !input.enabled {
        Some(Disabled)
    } else if !input.connected {
        Some(NotConnected)
    } else if input.playing {
        Some(Busy)
    } else if !elapsed_at_least(now, input.last_voice_activity, config.min_silence()) {
        Some(NotSilent)
    } else if !elapsed_at_least(now, input.last_global_play, config.global_cooldown()) {
        Some(GlobalCooldown)
    } else if !elapsed_at_least(now, input.last_mood_play, config.mood_cooldown()) {
        Some(MoodCooldown)
    } else if input.energy < config.min_energy && input.mood != Mood::Calm {
        Some(LowEnergy)
    } else {
        None
    };

    match deny {
        Some(reason) => Decision::Deny(reason),
        None => Decision::Allow,
    }
}
