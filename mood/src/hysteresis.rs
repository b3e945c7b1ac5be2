//! Mood confirmation with hysteresis.

use crate::Mood;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Configuration for [`Hysteresis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HysteresisConfig {
    /// How long a candidate must stay unchanged before it is confirmed
    /// (default: 3000).
    pub stability_ms: u64,
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        Self { stability_ms: 3000 }
    }
}

impl HysteresisConfig {
    pub fn stability(&self) -> Duration {
        Duration::from_millis(self.stability_ms)
    }
}

/// Emitted when the confirmed mood changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub from: Mood,
    pub to: Mood,
    pub at: Instant,
}

/// Two-label state machine: a `candidate` that tracks the classifier and a
/// `confirmed` mood that follows the candidate only after it has been
/// stable for the configured duration.
///
/// Both start as `NORMAL`.
#[derive(Debug, Clone)]
pub struct Hysteresis {
    stability: Duration,
    candidate: Mood,
    candidate_since: Instant,
    confirmed: Mood,
}

impl Hysteresis {
    pub fn new(stability: Duration, now: Instant) -> Self {
        Self {
            stability,
            candidate: Mood::Normal,
            candidate_since: now,
            confirmed: Mood::Normal,
        }
    }

    /// Feeds one classifier output. Returns a [`Confirmation`] when this
    /// observation changes the confirmed mood.
    pub fn observe(&mut self, mood: Mood, now: Instant) -> Option<Confirmation> {
        if mood != self.candidate {
            self.candidate = mood;
            self.candidate_since = now;
            return None;
        }

        if self.candidate == self.confirmed {
            return None;
        }
        if now.saturating_duration_since(self.candidate_since) < self.stability {
            return None;
        }

        let from = self.confirmed;
        self.confirmed = self.candidate;
        Some(Confirmation {
            from,
            to: self.confirmed,
            at: now,
        })
    }

    pub fn candidate(&self) -> Mood {
        self.candidate
    }

    pub fn candidate_since(&self) -> Instant {
        self.candidate_since
    }

    pub fn confirmed(&self) -> Mood {
        self.confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_initial_state() {
        let t0 = Instant::now();
        let h = Hysteresis::new(ms(3000), t0);
        assert_eq!(h.candidate(), Mood::Normal);
        assert_eq!(h.confirmed(), Mood::Normal);
        assert_eq!(h.candidate_since(), t0);
    }

    #[test]
    fn test_sustained_mood_confirms_exactly_once() {
        let t0 = Instant::now();
        let mut h = Hysteresis::new(ms(3000), t0);
        let mut confirmations = Vec::new();

        for i in 0..50u64 {
            if let Some(c) = h.observe(Mood::Sad, t0 + ms(200 * i)) {
                confirmations.push(c);
            }
        }

        assert_eq!(confirmations.len(), 1);
        let c = confirmations[0];
        assert_eq!(c.from, Mood::Normal);
        assert_eq!(c.to, Mood::Sad);
        // Candidate set at t=0, confirmed on the first tick at or past 3s.
        assert_eq!(c.at, t0 + ms(3000));
        assert_eq!(h.confirmed(), Mood::Sad);
    }

    #[test]
    fn test_not_confirmed_before_stability() {
        let t0 = Instant::now();
        let mut h = Hysteresis::new(ms(3000), t0);
        assert!(h.observe(Mood::Hype, t0).is_none());
        assert!(h.observe(Mood::Hype, t0 + ms(2999)).is_none());
        assert_eq!(h.confirmed(), Mood::Normal);
        assert!(h.observe(Mood::Hype, t0 + ms(3000)).is_some());
    }

    #[test]
    fn test_oscillation_never_confirms() {
        let t0 = Instant::now();
        let mut h = Hysteresis::new(ms(3000), t0);
        let moods = [Mood::Sad, Mood::Corny];

        // Switching every 2.8s never gives a candidate 3s of stability.
        for i in 0..200u64 {
            let mood = moods[((i * 200) / 2800 % 2) as usize];
            assert!(h.observe(mood, t0 + ms(200 * i)).is_none());
        }
        assert_eq!(h.confirmed(), Mood::Normal);
    }

    #[test]
    fn test_return_to_confirmed_resets_candidate() {
        let t0 = Instant::now();
        let mut h = Hysteresis::new(ms(1000), t0);
        h.observe(Mood::Tense, t0);
        h.observe(Mood::Tense, t0 + ms(1000));
        assert_eq!(h.confirmed(), Mood::Tense);

        // A brief blip does not disturb the confirmed mood.
        h.observe(Mood::Calm, t0 + ms(1200));
        assert!(h.observe(Mood::Tense, t0 + ms(1400)).is_none());
        assert!(h.observe(Mood::Tense, t0 + ms(5000)).is_none());
        assert_eq!(h.confirmed(), Mood::Tense);
        assert_eq!(h.candidate(), Mood::Tense);
    }
}
