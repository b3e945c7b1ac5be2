//! Per-session record of automatic plays.

use moodbox_mood::Mood;
use std::collections::HashMap;
use std::time::Instant;

/// Last-play timestamps and the AutoDJ switch for one session.
///
/// Only a successfully started automatic playback or an explicit toggle
/// mutates the ledger. Admission reads it.
#[derive(Debug, Clone)]
pub struct CooldownLedger {
    enabled: bool,
    last_global_play: Option<Instant>,
    last_mood_play: HashMap<Mood, Instant>,
}

impl Default for CooldownLedger {
    fn default() -> Self {
        Self {
            enabled: true,
            last_global_play: None,
            last_mood_play: HashMap::new(),
        }
    }
}

impl CooldownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Records a started automatic playback of `mood`.
    pub fn record_play(&mut self, mood: Mood, now: Instant) {
        self.last_global_play = Some(now);
        self.last_mood_play.insert(mood, now);
    }

    pub fn last_global_play(&self) -> Option<Instant> {
        self.last_global_play
    }

    pub fn last_mood_play(&self, mood: Mood) -> Option<Instant> {
        self.last_mood_play.get(&mood).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_enabled_by_default() {
        let ledger = CooldownLedger::new();
        assert!(ledger.is_enabled());
        assert_eq!(ledger.last_global_play(), None);
        assert_eq!(ledger.last_mood_play(Mood::Sad), None);
    }

    #[test]
    fn test_record_play() {
        let mut ledger = CooldownLedger::new();
        let t0 = Instant::now();
        ledger.record_play(Mood::Sad, t0);
        let t1 = t0 + Duration::from_secs(15);
        ledger.record_play(Mood::Hype, t1);

        assert_eq!(ledger.last_global_play(), Some(t1));
        assert_eq!(ledger.last_mood_play(Mood::Sad), Some(t0));
        assert_eq!(ledger.last_mood_play(Mood::Hype), Some(t1));
        assert_eq!(ledger.last_mood_play(Mood::Calm), None);
    }

    #[test]
    fn test_toggle() {
        let mut ledger = CooldownLedger::new();
        ledger.set_enabled(false);
        assert!(!ledger.is_enabled());
        ledger.set_enabled(true);
        assert!(ledger.is_enabled());
    }
}
