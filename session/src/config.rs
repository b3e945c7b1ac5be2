//! Engine configuration.
//!
//! Configuration is read from `~/.moodbox/config.yaml` unless a path is
//! given. Every key is optional; omitted keys keep their defaults.
//!
//! ```yaml
//! mood:
//!   classifier:
//!     profile: balanced
//! admission:
//!   global_cooldown_ms: 12000
//! recognizer:
//!   program: python3
//!   args: [stt.py]
//! sound_root: ./sounds
//! sounds:
//!   SAD: [sad/rain.mp3]
//!   STOP: [stop.mp3]
//! ```

use crate::ConfigError;
use moodbox_audio::Format;
use moodbox_autodj::{AdmissionConfig, RouterConfig, SoundCatalog};
use moodbox_mood::{Mood, MoodConfig};
use moodbox_recognizer::{ChunkConfig, RecognizerConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".moodbox";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Per-speaker capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerConfig {
    /// Loudness smoothing factor (default: 0.35).
    pub loudness_alpha: f32,
    /// Delay between speech end and stream teardown (default: 300).
    pub debounce_ms: u64,
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            loudness_alpha: moodbox_audio::energy::DEFAULT_LOUDNESS_ALPHA,
            debounce_ms: 300,
        }
    }
}

impl SpeakerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Session-wide audio settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Format of incoming speaker frames (default: 48kHz stereo).
    pub format: Format,
    /// Linear gain for every playback, clamped to [0, 1] (default: 0.9).
    pub playback_gain: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            format: Format::STEREO_48K,
            playback_gain: 0.9,
        }
    }
}

impl SessionConfig {
    pub fn gain(&self) -> f32 {
        if self.playback_gain.is_nan() {
            return 0.0;
        }
        self.playback_gain.clamp(0.0, 1.0)
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub speaker: SpeakerConfig,
    pub mood: MoodConfig,
    pub admission: AdmissionConfig,
    pub router: RouterConfig,
    pub chunk: ChunkConfig,
    pub recognizer: RecognizerConfig,
    pub session: SessionConfig,
    /// Directory all sound references are resolved against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_root: Option<PathBuf>,
    /// Sound references per mood, relative to `sound_root`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sounds: BTreeMap<Mood, Vec<String>>,
}

impl Config {
    /// Gets the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(DEFAULT_CONFIG_FILE))
    }

    /// Loads configuration from `path`, or from the default path.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path().ok_or(ConfigError::NoPath)?,
        };
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Parses YAML configuration.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Builds the sound catalog. Invalid references are logged and skipped.
    pub fn catalog(&self) -> SoundCatalog {
        let root = self
            .sound_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("sounds"));
        SoundCatalog::load(
            root,
            self.sounds.iter().map(|(mood, refs)| (*mood, refs.as_slice())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodbox_mood::{MoodThresholds, Profile};

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.speaker.debounce(), Duration::from_millis(300));
        assert_eq!(cfg.mood.aggregator.tick_ms, 200);
        assert_eq!(cfg.mood.hysteresis.stability_ms, 3000);
        assert_eq!(cfg.admission.mood_cooldown_ms, 22_000);
        assert_eq!(cfg.router.stop_confidence, 0.65);
        assert_eq!(cfg.chunk.min_chunk_bytes, 150_000);
        assert_eq!(cfg.recognizer.timeout_ms, 15_000);
        assert_eq!(cfg.session.gain(), 0.9);
        assert_eq!(cfg.mood.classifier.profile, Profile::Balanced);
    }

    #[test]
    fn test_parse_partial() {
        let cfg = Config::parse(
            "mood:\n  classifier:\n    profile: energy_only\nadmission:\n  min_energy: 0.02\nsounds:\n  sad: [a.mp3, b.mp3]\n",
        )
        .unwrap();
        assert_eq!(cfg.mood.classifier.thresholds(), MoodThresholds::energy_only());
        assert_eq!(cfg.admission.min_energy, 0.02);
        assert_eq!(cfg.admission.global_cooldown_ms, 12_000);
        assert_eq!(cfg.sounds[&Mood::Sad], vec!["a.mp3", "b.mp3"]);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_rejects_unknown_mood() {
        assert!(Config::parse("sounds:\n  GRUMPY: [a.mp3]\n").is_err());
    }

    #[test]
    fn test_gain_clamped() {
        let mut s = SessionConfig::default();
        s.playback_gain = 1.7;
        assert_eq!(s.gain(), 1.0);
        s.playback_gain = -0.2;
        assert_eq!(s.gain(), 0.0);
    }

    #[test]
    fn test_load_and_catalog() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rain.mp3"), b"x").unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            format!(
                "sound_root: {}\nsounds:\n  SAD: [rain.mp3, ../escape.mp3]\n",
                dir.path().display()
            ),
        )
        .unwrap();

        let cfg = Config::load(Some(&path)).unwrap();
        let catalog = cfg.catalog();
        assert_eq!(catalog.sounds(Mood::Sad).len(), 1);

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }
}
