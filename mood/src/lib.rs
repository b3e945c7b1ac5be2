//! Ambient mood inference from per-speaker loudness.
//!
//! # Pipeline
//!
//! Once per tick, for every active session:
//!
//! 1. [`Aggregator::tick`]: fresh speaker loudness -> rolling [`Features`]
//! 2. [`classify`]: smoothed features -> [`Mood`]
//! 3. [`Hysteresis::observe`]: mood -> optional [`Confirmation`]
//!
//! [`SessionMood`] runs all three for one session.
//!
//! # Profiles
//!
//! ```text
//! balanced:     CALM when voice ratio OR energy is low (default)
//! energy_only:  CALM when energy is low, narrower SAD/CORNY bands
//! ```

pub mod aggregator;
pub mod classifier;
pub mod hysteresis;
mod label;
mod state;

pub use aggregator::{Aggregator, AggregatorConfig, Features, SpeakerLevel, TickSample};
pub use classifier::{classify, CalmRule, ClassifierConfig, MoodThresholds, Profile};
pub use hysteresis::{Confirmation, Hysteresis, HysteresisConfig};
pub use label::Mood;
pub use state::{MoodConfig, SessionMood, TickOutcome};
