//! Per-session windowed voice features.
//!
//! Once per tick the aggregator folds every fresh, audible speaker into one
//! [`TickSample`] and appends it to a bounded rolling window. From the window
//! it derives three features:
//!
//! - voice ratio: fraction of ticks with at least one audible speaker
//! - energy average: mean per-tick energy across the window
//! - burst rate: speech-turn starts per second of window duration
//!
//! Voice ratio and energy average are additionally smoothed with an EMA to
//! produce the values the classifier and the admission controller consume.

use moodbox_audio::Ema;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Configuration for [`Aggregator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Tick interval in milliseconds (default: 200).
    pub tick_ms: u64,
    /// Rolling window duration in milliseconds (default: 20000).
    pub window_ms: u64,
    /// A speaker counts only if their last frame is at most this old (default: 450).
    pub freshness_ms: u64,
    /// A speaker counts only if their smoothed loudness exceeds this (default: 0.005).
    pub voice_threshold: f32,
    /// Smoothing factor applied to voice ratio and energy average (default: 0.25).
    pub smoothing_alpha: f32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            tick_ms: 200,
            window_ms: 20_000,
            freshness_ms: 450,
            voice_threshold: 0.005,
            smoothing_alpha: 0.25,
        }
    }
}

impl AggregatorConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn freshness(&self) -> Duration {
        Duration::from_millis(self.freshness_ms)
    }

    /// Maximum number of samples kept in the window: `window_ms / tick_ms`,
    /// never less than one.
    pub fn capacity(&self) -> usize {
        ((self.window_ms / self.tick_ms.max(1)) as usize).max(1)
    }
}

/// One speaker's state as seen by a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeakerLevel {
    /// Smoothed loudness in [0, 1].
    pub loudness: f32,
    /// Arrival time of the speaker's most recent frame.
    pub last_frame_at: Option<Instant>,
}

/// One tick's worth of aggregated voice activity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TickSample {
    pub has_voice: bool,
    pub instant_energy: f32,
    pub turn_starts: u32,
}

/// Features derived from the current window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Features {
    /// Fraction of ticks in the window with voice.
    pub voice_ratio: f32,
    /// Mean instant energy over the window.
    pub energy_avg: f32,
    /// Turn starts in the window divided by the window duration in seconds.
    pub burst_per_sec: f32,
    /// Smoothed voice ratio.
    pub ema_voice: f32,
    /// Smoothed energy average.
    pub ema_energy: f32,
    /// Whether the latest tick had voice.
    pub has_voice: bool,
}

/// Rolling feature aggregator for one session.
#[derive(Debug, Clone)]
pub struct Aggregator {
    config: AggregatorConfig,
    window: VecDeque<TickSample>,
    ema_voice: Ema,
    ema_energy: Ema,
    pending_turn_starts: u32,
    last_voice_activity: Option<Instant>,
    features: Features,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        let capacity = config.capacity();
        Self {
            ema_voice: Ema::new(config.smoothing_alpha),
            ema_energy: Ema::new(config.smoothing_alpha),
            window: VecDeque::with_capacity(capacity),
            pending_turn_starts: 0,
            last_voice_activity: None,
            features: Features::default(),
            config,
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Counts a speech-turn start toward the next tick.
    pub fn note_turn_start(&mut self) {
        self.pending_turn_starts = self.pending_turn_starts.saturating_add(1);
    }

    /// Runs one tick over the given speakers and returns the updated features.
    pub fn tick<I>(&mut self, now: Instant, speakers: I) -> Features
    where
        I: IntoIterator<Item = SpeakerLevel>,
    {
        let freshness = self.config.freshness();
        let mut active_count = 0u32;
        let mut energy_sum = 0.0f32;

        for speaker in speakers {
            let fresh = speaker
                .last_frame_at
                .is_some_and(|at| now.saturating_duration_since(at) <= freshness);
            if fresh && speaker.loudness > self.config.voice_threshold {
                active_count += 1;
                energy_sum += speaker.loudness;
            }
        }

        let has_voice = active_count > 0;
        let instant_energy = if has_voice {
            energy_sum / active_count as f32
        } else {
            0.0
        };

        let turn_starts = std::mem::take(&mut self.pending_turn_starts);
        self.push(TickSample {
            has_voice,
            instant_energy,
            turn_starts,
        });

        if has_voice {
            self.last_voice_activity = Some(now);
        }

        self.features
    }

    fn push(&mut self, sample: TickSample) {
        self.window.push_back(sample);
        while self.window.len() > self.config.capacity() {
            self.window.pop_front();
        }

        let len = self.window.len() as f32;
        let voiced = self.window.iter().filter(|s| s.has_voice).count() as f32;
        let energy: f32 = self.window.iter().map(|s| s.instant_energy).sum();
        let turns: u32 = self.window.iter().map(|s| s.turn_starts).sum();
        let window_secs = self.config.window().as_secs_f32();

        let voice_ratio = voiced / len;
        let energy_avg = energy / len;
        let burst_per_sec = if window_secs > 0.0 {
            turns as f32 / window_secs
        } else {
            0.0
        };

        self.features = Features {
            voice_ratio,
            energy_avg,
            burst_per_sec,
            ema_voice: self.ema_voice.update(voice_ratio),
            ema_energy: self.ema_energy.update(energy_avg),
            has_voice: sample.has_voice,
        };
    }

    /// Features as of the latest tick.
    pub fn features(&self) -> Features {
        self.features
    }

    /// Time of the latest tick that had voice.
    pub fn last_voice_activity(&self) -> Option<Instant> {
        self.last_voice_activity
    }

    /// Samples currently in the window, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TickSample> {
        self.window.iter()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn voiced(at: Instant, loudness: f32) -> SpeakerLevel {
        SpeakerLevel {
            loudness,
            last_frame_at: Some(at),
        }
    }

    #[test]
    fn test_capacity() {
        assert_eq!(AggregatorConfig::default().capacity(), 100);
        let cfg = AggregatorConfig {
            tick_ms: 200,
            window_ms: 1000,
            ..Default::default()
        };
        assert_eq!(cfg.capacity(), 5);
        let cfg = AggregatorConfig {
            tick_ms: 500,
            window_ms: 100,
            ..Default::default()
        };
        assert_eq!(cfg.capacity(), 1);
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let cfg = AggregatorConfig {
            window_ms: 1000,
            ..Default::default()
        };
        let mut agg = Aggregator::new(cfg);
        let t0 = Instant::now();
        for i in 0..20 {
            agg.tick(t0 + ms(200 * i), std::iter::empty());
            assert!(agg.len() <= 5);
        }
        assert_eq!(agg.len(), 5);
    }

    #[test]
    fn test_stale_and_quiet_speakers_are_ignored() {
        let mut agg = Aggregator::new(AggregatorConfig::default());
        let t0 = Instant::now();
        let now = t0 + ms(1000);

        let stale = voiced(now - ms(451), 0.2);
        let quiet = voiced(now, 0.005);
        let never = SpeakerLevel {
            loudness: 0.3,
            last_frame_at: None,
        };
        let features = agg.tick(now, [stale, quiet, never]);

        assert!(!features.has_voice);
        assert_eq!(features.voice_ratio, 0.0);
        assert_eq!(agg.last_voice_activity(), None);
    }

    #[test]
    fn test_instant_energy_is_mean_of_active_speakers() {
        let mut agg = Aggregator::new(AggregatorConfig::default());
        let now = Instant::now() + ms(1000);
        agg.tick(now, [voiced(now, 0.02), voiced(now - ms(450), 0.04), voiced(now, 0.001)]);

        let sample = *agg.history().last().unwrap();
        assert!(sample.has_voice);
        assert!((sample.instant_energy - 0.03).abs() < 1e-6);
        assert_eq!(agg.last_voice_activity(), Some(now));
    }

    #[test]
    fn test_ratio_energy_and_smoothing() {
        let cfg = AggregatorConfig {
            window_ms: 800,
            ..Default::default()
        };
        let mut agg = Aggregator::new(cfg);
        let t0 = Instant::now();

        let f1 = agg.tick(t0, [voiced(t0, 0.04)]);
        assert_eq!(f1.voice_ratio, 1.0);
        assert!((f1.energy_avg - 0.04).abs() < 1e-6);
        assert!((f1.ema_voice - 0.25).abs() < 1e-6);
        assert!((f1.ema_energy - 0.01).abs() < 1e-6);

        let t1 = t0 + ms(200);
        let f2 = agg.tick(t1, std::iter::empty());
        assert_eq!(f2.voice_ratio, 0.5);
        assert!((f2.energy_avg - 0.02).abs() < 1e-6);
        assert!((f2.ema_voice - (0.25 * 0.5 + 0.75 * 0.25)).abs() < 1e-6);
        assert_eq!(agg.last_voice_activity(), Some(t0));
    }

    #[test]
    fn test_burst_rate_counts_turns_over_window_duration() {
        let cfg = AggregatorConfig {
            window_ms: 2000,
            ..Default::default()
        };
        let mut agg = Aggregator::new(cfg);
        let t0 = Instant::now();

        agg.note_turn_start();
        agg.note_turn_start();
        let f = agg.tick(t0, std::iter::empty());
        assert!((f.burst_per_sec - 1.0).abs() < 1e-6);
        assert_eq!(agg.history().last().unwrap().turn_starts, 2);

        // Counter resets after each tick.
        agg.note_turn_start();
        let f = agg.tick(t0 + ms(200), std::iter::empty());
        assert!((f.burst_per_sec - 1.5).abs() < 1e-6);
        assert_eq!(agg.history().last().unwrap().turn_starts, 1);

        // Turns age out with the window (10 samples).
        for i in 2..12 {
            agg.tick(t0 + ms(200 * i), std::iter::empty());
        }
        assert_eq!(agg.features().burst_per_sec, 0.0);
    }
}
