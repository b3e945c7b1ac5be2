//! External-process recognizer.

use crate::{parse_output, Recognition, RecognizerError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Turns an audio file into a [`Recognition`].
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognizes the WAV file at `wav`. `Ok(None)` means the recognizer
    /// produced nothing usable.
    async fn recognize(&self, wav: &Path) -> Result<Option<Recognition>, RecognizerError>;
}

/// Recognizer process configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Program to run. Recognition is disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,
    /// Arguments placed before the WAV path.
    pub args: Vec<String>,
    /// Hard deadline for one invocation (default: 15000).
    pub timeout_ms: u64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: Vec::new(),
            timeout_ms: 15_000,
        }
    }
}

impl RecognizerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Builds the configured recognizer, if any.
    pub fn build(&self) -> Option<CommandRecognizer> {
        let program = self.program.clone()?;
        Some(CommandRecognizer::new(program, self.args.clone(), self.timeout()))
    }
}

/// Runs `program args... <wav>` and parses its stdout.
///
/// The child is killed when the deadline passes or when the returned
/// future is dropped.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Recognizer for CommandRecognizer {
    async fn recognize(&self, wav: &Path) -> Result<Option<Recognition>, RecognizerError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(wav)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(RecognizerError::Spawn)?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| RecognizerError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(RecognizerError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = parse_output(&stdout);
        if result.is_none() {
            if stdout.trim().is_empty() {
                debug!(program = %self.program.display(), "recognizer produced no output");
            } else {
                warn!(program = %self.program.display(), "unparseable recognizer output");
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodbox_mood::Mood;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn script(body: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".sh").tempfile().unwrap();
        writeln!(file, "{body}").unwrap();
        file.flush().unwrap();
        file
    }

    fn sh(script: &NamedTempFile, timeout: Duration) -> CommandRecognizer {
        CommandRecognizer::new(
            "/bin/sh",
            vec![script.path().display().to_string()],
            timeout,
        )
    }

    #[tokio::test]
    async fn test_parses_result_and_receives_path() {
        let s = script(
            r#"echo "loading"
test -f "$1" || exit 3
echo '{"text":"que triste","intent":"MOOD","mood":"SAD","confidence":0.81}'"#,
        );
        let input = NamedTempFile::new().unwrap();
        let r = sh(&s, Duration::from_secs(5))
            .recognize(input.path())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(r.mood(), Some(Mood::Sad));
        assert_eq!(r.text, "que triste");
    }

    #[tokio::test]
    async fn test_empty_output_is_none() {
        let s = script("exit 0");
        let input = NamedTempFile::new().unwrap();
        let r = sh(&s, Duration::from_secs(5)).recognize(input.path()).await.unwrap();
        assert_eq!(r, None);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_error() {
        let s = script("echo boom >&2; exit 2");
        let input = NamedTempFile::new().unwrap();
        let err = sh(&s, Duration::from_secs(5))
            .recognize(input.path())
            .await
            .unwrap_err();
        match err {
            RecognizerError::Exit { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let s = script(&format!("sleep 1; touch '{}'", marker.display()));
        let input = NamedTempFile::new().unwrap();
        let err = sh(&s, Duration::from_millis(200))
            .recognize(input.path())
            .await
            .unwrap_err();
        assert!(matches!(err, RecognizerError::Timeout(_)));

        // A surviving shell would have created the marker by now.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_missing_program() {
        let r = CommandRecognizer::new("/nonexistent/recognizer", vec![], Duration::from_secs(1));
        let input = NamedTempFile::new().unwrap();
        assert!(matches!(
            r.recognize(input.path()).await,
            Err(RecognizerError::Spawn(_))
        ));
    }

    #[test]
    fn test_config_build() {
        assert!(RecognizerConfig::default().build().is_none());
        let cfg: RecognizerConfig =
            serde_yaml::from_str("program: python3\nargs: [stt.py]\ntimeout_ms: 1000\n").unwrap();
        let r = cfg.build().unwrap();
        assert_eq!(r.timeout(), Duration::from_secs(1));
    }
}
