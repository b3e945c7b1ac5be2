//! Threshold-based mood classification.
//!
//! [`classify`] is a pure function of the three smoothed features. Rules are
//! evaluated in a fixed order and the first match wins:
//!
//! 1. `CALM`: quiet room
//! 2. `SAD`, `CORNY`: soft conversation bands
//! 3. `CHAOS`: busy room with many turn starts
//! 4. `HYPE`: busy and loud
//! 5. `TENSE`: few voices but loud
//! 6. `NORMAL` otherwise
//!
//! Upper bounds (`*_max_*`) and lower bounds (`*_min_*`) are both inclusive.
//! `STOP` is never produced.

use crate::Mood;
use serde::{Deserialize, Serialize};

/// How the `CALM` rule combines its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalmRule {
    /// Calm when the voice ratio OR the energy is at or below its bound.
    #[default]
    RatioOrEnergy,
    /// Calm only when the energy is at or below its bound.
    EnergyOnly,
}

/// Classifier thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodThresholds {
    pub calm_rule: CalmRule,
    pub calm_max_ratio: f32,
    pub calm_max_energy: f32,

    pub sad_max_ratio: f32,
    pub sad_max_energy: f32,
    pub sad_max_burst: f32,

    pub corny_max_ratio: f32,
    pub corny_max_energy: f32,
    pub corny_max_burst: f32,

    /// Minimum voice ratio for the busy-room rules (`CHAOS`, `HYPE`).
    pub busy_min_ratio: f32,
    pub chaos_min_burst: f32,
    pub hype_min_energy: f32,

    pub tense_max_ratio: f32,
    pub tense_min_energy: f32,
}

impl MoodThresholds {
    /// The default rule set: calm on low ratio or low energy, wide soft bands.
    pub fn balanced() -> Self {
        Self {
            calm_rule: CalmRule::RatioOrEnergy,
            calm_max_ratio: 0.12,
            calm_max_energy: 0.006,

            sad_max_ratio: 0.45,
            sad_max_energy: 0.03,
            sad_max_burst: 0.5,

            corny_max_ratio: 0.7,
            corny_max_energy: 0.04,
            corny_max_burst: 1.0,

            busy_min_ratio: 0.6,
            chaos_min_burst: 1.2,
            hype_min_energy: 0.06,

            tense_max_ratio: 0.5,
            tense_min_energy: 0.06,
        }
    }

    /// The alternate rule set: calm on energy alone, narrower soft bands.
    pub fn energy_only() -> Self {
        Self {
            calm_rule: CalmRule::EnergyOnly,
            calm_max_ratio: 0.0,
            calm_max_energy: 0.008,

            sad_max_ratio: 0.35,
            sad_max_energy: 0.02,
            sad_max_burst: 0.3,

            corny_max_ratio: 0.6,
            corny_max_energy: 0.035,
            corny_max_burst: 0.8,

            ..Self::balanced()
        }
    }
}

impl Default for MoodThresholds {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Named threshold profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    #[default]
    Balanced,
    EnergyOnly,
}

impl Profile {
    pub fn thresholds(&self) -> MoodThresholds {
        match self {
            Profile::Balanced => MoodThresholds::balanced(),
            Profile::EnergyOnly => MoodThresholds::energy_only(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Balanced => "balanced",
            Profile::EnergyOnly => "energy_only",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "balanced" => Some(Profile::Balanced),
            "energy_only" => Some(Profile::EnergyOnly),
            _ => None,
        }
    }
}

/// Classifier configuration: a named profile, optionally overridden by
/// explicit thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClassifierConfig {
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<MoodThresholds>,
}

impl ClassifierConfig {
    /// Returns the effective thresholds.
    pub fn thresholds(&self) -> MoodThresholds {
        self.thresholds
            .clone()
            .unwrap_or_else(|| self.profile.thresholds())
    }
}

/// Maps the smoothed voice ratio, smoothed energy and burst rate to a mood.
pub fn classify(t: &MoodThresholds, voice_ratio: f32, energy: f32, burst_per_sec: f32) -> Mood {
    let calm = match t.calm_rule {
        CalmRule::RatioOrEnergy => voice_ratio <= t.calm_max_ratio || energy <= t.calm_max_energy,
        CalmRule::EnergyOnly => energy <= t.calm_max_energy,
    };
    if calm {
        return Mood::Calm;
    }

    if voice_ratio <= t.sad_max_ratio
        && energy <= t.sad_max_energy
        && burst_per_sec <= t.sad_max_burst
    {
        return Mood::Sad;
    }

    if voice_ratio <= t.corny_max_ratio
        && energy <= t.corny_max_energy
        && burst_per_sec <= t.corny_max_burst
    {
        return Mood::Corny;
    }

    if voice_ratio >= t.busy_min_ratio && burst_per_sec >= t.chaos_min_burst {
        return Mood::Chaos;
    }

    if voice_ratio >= t.busy_min_ratio && energy >= t.hype_min_energy {
        return Mood::Hype;
    }

    if voice_ratio <= t.tense_max_ratio && energy >= t.tense_min_energy {
        return Mood::Tense;
    }

    Mood::Normal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(r: f32, e: f32, burst: f32) -> Mood {
        classify(&MoodThresholds::balanced(), r, e, burst)
    }

    fn eo(r: f32, e: f32, burst: f32) -> Mood {
        classify(&MoodThresholds::energy_only(), r, e, burst)
    }

    #[test]
    fn test_balanced_rules() {
        assert_eq!(b(0.0, 0.0, 0.0), Mood::Calm);
        assert_eq!(b(0.1, 0.05, 0.0), Mood::Calm);
        assert_eq!(b(0.5, 0.004, 0.0), Mood::Calm);
        assert_eq!(b(0.33, 0.017, 0.33), Mood::Sad);
        assert_eq!(b(0.6, 0.035, 0.8), Mood::Corny);
        assert_eq!(b(0.8, 0.05, 1.5), Mood::Chaos);
        assert_eq!(b(0.8, 0.09, 0.4), Mood::Hype);
        assert_eq!(b(0.3, 0.08, 0.1), Mood::Tense);
        assert_eq!(b(0.8, 0.05, 0.5), Mood::Normal);
        assert_eq!(b(0.55, 0.08, 0.1), Mood::Normal);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let t = MoodThresholds::balanced();
        assert_eq!(b(t.calm_max_ratio, 0.02, 0.0), Mood::Calm);
        assert_eq!(b(0.3, t.calm_max_energy, 0.0), Mood::Calm);
        assert_eq!(b(t.sad_max_ratio, t.sad_max_energy, t.sad_max_burst), Mood::Sad);
        assert_eq!(b(t.corny_max_ratio, t.corny_max_energy, t.corny_max_burst), Mood::Corny);
        assert_eq!(b(t.busy_min_ratio, 0.05, t.chaos_min_burst), Mood::Chaos);
        assert_eq!(b(t.busy_min_ratio, t.hype_min_energy, 0.0), Mood::Hype);
        assert_eq!(b(t.tense_max_ratio, t.tense_min_energy, 0.0), Mood::Tense);
    }

    #[test]
    fn test_precedence_first_match_wins() {
        // Busy and loud with many turns: CHAOS before HYPE.
        assert_eq!(b(0.9, 0.1, 2.0), Mood::Chaos);
        // Low energy wins over everything else.
        assert_eq!(b(0.9, 0.001, 3.0), Mood::Calm);
    }

    #[test]
    fn test_energy_only_profile() {
        // Low ratio alone is not calm.
        assert_eq!(eo(0.05, 0.015, 0.0), Mood::Sad);
        assert_eq!(b(0.05, 0.015, 0.0), Mood::Calm);
        assert_eq!(eo(0.5, 0.007, 0.0), Mood::Calm);
        // Narrower SAD band.
        assert_eq!(eo(0.4, 0.017, 0.2), Mood::Corny);
        assert_eq!(b(0.4, 0.017, 0.2), Mood::Sad);
    }

    #[test]
    fn test_total_and_never_stop() {
        let steps = [0.0f32, 0.001, 0.006, 0.01, 0.02, 0.05, 0.1, 0.3, 0.5, 0.7, 1.0, 2.0, 10.0];
        for profile in [Profile::Balanced, Profile::EnergyOnly] {
            let t = profile.thresholds();
            for &r in &steps {
                for &e in &steps {
                    for &burst in &steps {
                        let first = classify(&t, r, e, burst);
                        assert_ne!(first, Mood::Stop);
                        assert_eq!(first, classify(&t, r, e, burst));
                    }
                }
            }
        }
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::parse("balanced"), Some(Profile::Balanced));
        assert_eq!(Profile::parse("energy-only"), Some(Profile::EnergyOnly));
        assert_eq!(Profile::parse("ENERGY_ONLY"), Some(Profile::EnergyOnly));
        assert_eq!(Profile::parse("loud"), None);
    }

    #[test]
    fn test_classifier_config_override() {
        let cfg: ClassifierConfig = serde_yaml::from_str("profile: energy_only").unwrap();
        assert_eq!(cfg.thresholds(), MoodThresholds::energy_only());

        let mut custom = MoodThresholds::balanced();
        custom.calm_max_ratio = 0.2;
        let cfg = ClassifierConfig {
            profile: Profile::EnergyOnly,
            thresholds: Some(custom.clone()),
        };
        assert_eq!(cfg.thresholds(), custom);
    }
}
