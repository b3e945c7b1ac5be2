//! Recognize command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use moodbox_autodj::{route, Route};
use moodbox_recognizer::{Recognition, Recognizer, RecognizerError};

use super::{load_config, output_result};
use crate::Cli;

/// Runs the configured recognizer once on a WAV file.
#[derive(Args)]
pub struct RecognizeCommand {
    /// WAV file to recognize
    file: PathBuf,
}

#[derive(Serialize)]
struct RecognizeOutput {
    #[serde(flatten)]
    result: Recognition,
    /// What a session would do with this result.
    action: String,
}

impl RecognizeCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = load_config(cli)?;
        let recognizer = config
            .recognizer
            .build()
            .ok_or(RecognizerError::NotConfigured)?;
        if !self.file.is_file() {
            anyhow::bail!("file not found: {}", self.file.display());
        }

        tracing::debug!(file = %self.file.display(), "running recognizer");
        let Some(result) = recognizer.recognize(&self.file).await? else {
            anyhow::bail!("recognizer printed no result");
        };

        let action = match route(&config.router, &result, &config.catalog()) {
            Route::Stop => "stop".to_string(),
            Route::Admit(mood) => format!("admit {}", mood),
            Route::Ignore => "ignore".to_string(),
        };
        output_result(
            &RecognizeOutput { result, action },
            cli.output.as_deref(),
            true,
        )
    }
}
