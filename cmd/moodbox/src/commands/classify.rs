//! Classify command.

use clap::Args;
use serde::Serialize;

use moodbox_mood::{classify, Mood, Profile};

use super::{load_config, output_result};
use crate::Cli;

/// Classifies one set of smoothed features.
///
/// Uses the configured thresholds unless --profile is given.
#[derive(Args)]
pub struct ClassifyCommand {
    /// Smoothed voice ratio in [0, 1]
    #[arg(long)]
    voice: f32,
    /// Smoothed energy
    #[arg(long)]
    energy: f32,
    /// Turn starts per second
    #[arg(long, default_value_t = 0.0)]
    burst: f32,
    /// Threshold profile (balanced, energy_only)
    #[arg(short = 'p', long)]
    profile: Option<String>,
}

#[derive(Serialize)]
struct ClassifyOutput {
    mood: Mood,
    profile: String,
}

impl ClassifyCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let (thresholds, profile) = match self.profile.as_deref() {
            Some(name) => {
                let profile = Profile::parse(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown profile '{}'", name))?;
                (profile.thresholds(), profile.as_str().to_string())
            }
            None => {
                let config = load_config(cli)?;
                let classifier = &config.mood.classifier;
                let name = if classifier.thresholds.is_some() {
                    "custom".to_string()
                } else {
                    classifier.profile.as_str().to_string()
                };
                (classifier.thresholds(), name)
            }
        };

        let mood = classify(&thresholds, self.voice, self.energy, self.burst);
        if cli.json {
            return output_result(&ClassifyOutput { mood, profile }, cli.output.as_deref(), true);
        }
        println!("{}", mood);
        Ok(())
    }
}
