//! Recognizer output.

use moodbox_mood::Mood;
use serde::{Deserialize, Serialize};

/// Structured result printed by the recognizer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Recognition {
    pub text: String,
    pub intent: String,
    pub mood: String,
    pub confidence: f32,
}

impl Recognition {
    /// Reports whether the intent is `STOP` (any case).
    pub fn is_stop(&self) -> bool {
        self.intent.trim().eq_ignore_ascii_case("STOP")
    }

    /// The mood field as a label. `NONE`, empty and unknown values are `None`.
    pub fn mood(&self) -> Option<Mood> {
        Mood::parse(&self.mood)
    }
}

/// Extracts a [`Recognition`] from the recognizer's stdout.
///
/// Diagnostic lines are tolerated: the last non-empty line that parses as a
/// result wins. Confidence is clamped to [0, 1].
pub fn parse_output(stdout: &str) -> Option<Recognition> {
    let mut result = stdout
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| serde_json::from_str::<Recognition>(line).ok())?;

    result.confidence = if result.confidence.is_finite() {
        result.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    Some(result)
}
