//! One recognition round trip: PCM -> temporary WAV -> recognizer.

use crate::{Recognition, Recognizer, RecognizerError};
use moodbox_audio::{wav, Format};
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::warn;

/// Writes `pcm` to a temporary WAV file, runs the recognizer on it and
/// removes the file.
///
/// Every failure is logged and reported as `None`. The temporary file is
/// removed on every path, including when the returned future is dropped.
pub async fn dispatch(recognizer: &dyn Recognizer, pcm: &[u8], format: Format) -> Option<Recognition> {
    let file = match write_temp_wav(pcm, format) {
        Ok(file) => file,
        Err(e) => {
            warn!(error = %e, "failed to write recognition chunk");
            return None;
        }
    };

    let result = recognizer.recognize(file.path()).await;

    if let Err(e) = file.close() {
        warn!(error = %e, "failed to remove recognition chunk");
    }

    match result {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "recognition failed");
            None
        }
    }
}

fn write_temp_wav(pcm: &[u8], format: Format) -> Result<NamedTempFile, RecognizerError> {
    let mut file = tempfile::Builder::new()
        .prefix("moodbox-chunk-")
        .suffix(".wav")
        .tempfile()?;
    wav::write_to(file.as_file_mut(), pcm, format)?;
    file.as_file_mut().flush()?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        seen: Mutex<Option<(PathBuf, Vec<u8>)>>,
        fail: bool,
    }

    #[async_trait]
    impl Recognizer for Capture {
        async fn recognize(&self, wav: &Path) -> Result<Option<Recognition>, RecognizerError> {
            let bytes = std::fs::read(wav)?;
            *self.seen.lock().unwrap() = Some((wav.to_path_buf(), bytes));
            if self.fail {
                return Err(RecognizerError::Timeout(std::time::Duration::from_secs(15)));
            }
            Ok(Some(Recognition {
                intent: "MOOD".into(),
                mood: "HYPE".into(),
                confidence: 0.9,
                ..Default::default()
            }))
        }
    }

    #[tokio::test]
    async fn test_dispatch_writes_wav_and_cleans_up() {
        let capture = Capture::default();
        let pcm = vec![7u8; 4000];
        let r = dispatch(&capture, &pcm, Format::STEREO_48K).await.unwrap();
        assert_eq!(r.mood, "HYPE");

        let (path, bytes) = capture.seen.lock().unwrap().take().unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("wav"));
        assert_eq!(bytes.len(), wav::HEADER_LEN + pcm.len());
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[wav::HEADER_LEN..], &pcm[..]);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_dispatch_cleans_up_on_error() {
        let capture = Capture {
            fail: true,
            ..Default::default()
        };
        assert_eq!(dispatch(&capture, &[0u8; 64], Format::STEREO_48K).await, None);
        let (path, _) = capture.seen.lock().unwrap().take().unwrap();
        assert!(!path.exists());
    }
}
