//! Time-domain loudness estimation.
//!
//! A frame's loudness is the root-mean-square of its samples normalized to
//! [-1, 1). Per-speaker loudness is smoothed with an exponential moving
//! average so a single loud or quiet frame does not swing the estimate.

use crate::pcm::samples;
use std::time::{Duration, Instant};

/// Default smoothing factor for per-speaker loudness.
pub const DEFAULT_LOUDNESS_ALPHA: f32 = 0.35;

const FULL_SCALE: f64 = 32768.0;

/// Computes the normalized RMS of a signed 16-bit little-endian frame.
///
/// Returns 0 for an empty frame. For non-clipping audio the result lies
/// in [0, 1].
pub fn rms(frame: &[u8]) -> f32 {
    let mut sum_squares = 0.0f64;
    let mut count = 0usize;
    for sample in samples(frame) {
        let normalized = sample as f64 / FULL_SCALE;
        sum_squares += normalized * normalized;
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    (sum_squares / count as f64).sqrt() as f32
}

/// Exponential moving average: `value = alpha * sample + (1 - alpha) * value`.
///
/// Starts at 0. For non-negative input the value never leaves
/// `[0, max(samples)]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    alpha: f32,
    value: f32,
}

impl Ema {
    /// Creates an average with the given smoothing factor.
    ///
    /// Factors outside (0, 1] fall back to 1 (no smoothing).
    pub fn new(alpha: f32) -> Self {
        let alpha = if alpha > 0.0 && alpha <= 1.0 { alpha } else { 1.0 };
        Self { alpha, value: 0.0 }
    }

    /// Folds a sample into the average and returns the new value.
    pub fn update(&mut self, sample: f32) -> f32 {
        self.value = self.alpha * sample + (1.0 - self.alpha) * self.value;
        self.value
    }

    /// Returns the current value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Returns the smoothing factor.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

/// Tracks one speaker's smoothed loudness and the arrival time of their
/// most recent frame.
#[derive(Debug, Clone)]
pub struct LoudnessMeter {
    ema: Ema,
    last_frame_at: Option<Instant>,
}

impl LoudnessMeter {
    pub fn new(alpha: f32) -> Self {
        Self {
            ema: Ema::new(alpha),
            last_frame_at: None,
        }
    }

    /// Measures a frame, folds it into the smoothed loudness and records
    /// `now` as the freshness timestamp. Returns the frame's raw RMS.
    pub fn observe(&mut self, frame: &[u8], now: Instant) -> f32 {
        let level = rms(frame);
        self.ema.update(level);
        self.last_frame_at = Some(now);
        level
    }

    /// Smoothed loudness in [0, 1].
    pub fn loudness(&self) -> f32 {
        self.ema.value()
    }

    pub fn last_frame_at(&self) -> Option<Instant> {
        self.last_frame_at
    }

    /// Reports whether a frame arrived within `freshness` of `now`.
    pub fn is_fresh(&self, now: Instant, freshness: Duration) -> bool {
        match self.last_frame_at {
            Some(at) => now.saturating_duration_since(at) <= freshness,
            None => false,
        }
    }
}

impl Default for LoudnessMeter {
    fn default() -> Self {
        Self::new(DEFAULT_LOUDNESS_ALPHA)
    }
}
