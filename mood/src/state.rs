//! Per-session mood state: aggregator, classifier and hysteresis together.

use crate::aggregator::{Aggregator, AggregatorConfig, Features, SpeakerLevel};
use crate::classifier::{classify, ClassifierConfig, MoodThresholds};
use crate::hysteresis::{Confirmation, Hysteresis, HysteresisConfig};
use crate::Mood;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Configuration for the whole mood pipeline of one session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    pub aggregator: AggregatorConfig,
    pub classifier: ClassifierConfig,
    pub hysteresis: HysteresisConfig,
}

/// Result of one [`SessionMood::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub features: Features,
    /// Raw classifier output for this tick.
    pub classified: Mood,
    pub candidate: Mood,
    pub confirmed: Mood,
    /// Set when this tick changed the confirmed mood.
    pub transition: Option<Confirmation>,
}

/// Mood state of one session.
#[derive(Debug, Clone)]
pub struct SessionMood {
    aggregator: Aggregator,
    thresholds: MoodThresholds,
    hysteresis: Hysteresis,
}

impl SessionMood {
    pub fn new(config: &MoodConfig, now: Instant) -> Self {
        Self {
            aggregator: Aggregator::new(config.aggregator.clone()),
            thresholds: config.classifier.thresholds(),
            hysteresis: Hysteresis::new(config.hysteresis.stability(), now),
        }
    }

    pub fn note_turn_start(&mut self) {
        self.aggregator.note_turn_start();
    }

    /// Aggregates the speakers, classifies the smoothed features and feeds
    /// the label through hysteresis.
    pub fn tick<I>(&mut self, now: Instant, speakers: I) -> TickOutcome
    where
        I: IntoIterator<Item = SpeakerLevel>,
    {
        let features = self.aggregator.tick(now, speakers);
        let classified = classify(
            &self.thresholds,
            features.ema_voice,
            features.ema_energy,
            features.burst_per_sec,
        );
        let transition = self.hysteresis.observe(classified, now);
        TickOutcome {
            features,
            classified,
            candidate: self.hysteresis.candidate(),
            confirmed: self.hysteresis.confirmed(),
            transition,
        }
    }

    pub fn confirmed(&self) -> Mood {
        self.hysteresis.confirmed()
    }

    pub fn candidate(&self) -> Mood {
        self.hysteresis.candidate()
    }

    pub fn features(&self) -> Features {
        self.aggregator.features()
    }

    pub fn last_voice_activity(&self) -> Option<Instant> {
        self.aggregator.last_voice_activity()
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }
}
