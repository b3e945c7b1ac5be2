//! Audio utilities for voice-frame analysis.
//!
//! This crate provides:
//!
//! - `pcm`: signed 16-bit PCM format handling
//! - `energy`: frame RMS and smoothed per-speaker loudness
//! - `wav`: uncompressed WAV container encoding
//!
//! # Example
//!
//! ```rust
//! use moodbox_audio::energy::rms;
//! use moodbox_audio::pcm::{to_bytes, Format};
//! use moodbox_audio::wav;
//!
//! let frame = to_bytes(&[0i16; 1920]);
//! assert_eq!(rms(&frame), 0.0);
//!
//! let file = wav::encode(&frame, Format::STEREO_48K).unwrap();
//! assert_eq!(file.len(), wav::HEADER_LEN + frame.len());
//! ```

pub mod energy;
mod error;
pub mod pcm;
pub mod wav;

pub use energy::{rms, Ema, LoudnessMeter};
pub use error::AudioError;
pub use pcm::Format;
