//! Mood labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete ambient mood.
///
/// `Stop` is a manual sentinel: the classifier never produces it, and it can
/// only arrive from a recognizer result or an explicit command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Mood {
    Calm,
    Sad,
    Corny,
    Chaos,
    Hype,
    Tense,
    #[default]
    Normal,
    Stop,
}

impl Mood {
    /// Every label, in classifier precedence order followed by `Stop`.
    pub const ALL: [Mood; 8] = [
        Mood::Calm,
        Mood::Sad,
        Mood::Corny,
        Mood::Chaos,
        Mood::Hype,
        Mood::Tense,
        Mood::Normal,
        Mood::Stop,
    ];

    /// Returns the canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Calm => "CALM",
            Mood::Sad => "SAD",
            Mood::Corny => "CORNY",
            Mood::Chaos => "CHAOS",
            Mood::Hype => "HYPE",
            Mood::Tense => "TENSE",
            Mood::Normal => "NORMAL",
            Mood::Stop => "STOP",
        }
    }

    /// Parses a label case-insensitively. Empty, `NONE` and unknown names
    /// yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }

    /// Returns true for the manual-only `Stop` sentinel.
    pub fn is_manual_only(&self) -> bool {
        matches!(self, Mood::Stop)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Mood {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Mood {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Mood::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("unknown mood: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_string() {
        assert_eq!(Mood::Calm.to_string(), "CALM");
        assert_eq!(Mood::Normal.to_string(), "NORMAL");
        assert_eq!(Mood::Stop.to_string(), "STOP");
    }

    #[test]
    fn test_mood_parse() {
        assert_eq!(Mood::parse("sad"), Some(Mood::Sad));
        assert_eq!(Mood::parse(" Hype "), Some(Mood::Hype));
        assert_eq!(Mood::parse("STOP"), Some(Mood::Stop));
        assert_eq!(Mood::parse("NONE"), None);
        assert_eq!(Mood::parse(""), None);
        assert_eq!(Mood::parse("grumpy"), None);
    }

    #[test]
    fn test_mood_serialize() {
        let json = serde_json::to_string(&Mood::Corny).unwrap();
        assert_eq!(json, r#""CORNY""#);
        let restored: Mood = serde_json::from_str(r#""corny""#).unwrap();
        assert_eq!(restored, Mood::Corny);
        assert!(serde_json::from_str::<Mood>(r#""NONE""#).is_err());
    }

    #[test]
    fn test_only_stop_is_manual() {
        for mood in Mood::ALL {
            assert_eq!(mood.is_manual_only(), mood == Mood::Stop);
        }
    }
}
