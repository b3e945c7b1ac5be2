//! Speech recognition over short audio chunks.
//!
//! Frames for each speaker accumulate in a [`ChunkBuffer`]. When a chunk is
//! due, [`DispatchGates`] decide whether it may go out, and [`dispatch`]
//! writes it to a temporary WAV file and hands it to a [`Recognizer`].
//!
//! The bundled [`CommandRecognizer`] runs an external program with the
//! WAV path as its last argument and expects one JSON line on stdout:
//!
//! ```text
//! {"text": "...", "intent": "STOP|MOOD|NONE", "mood": "SAD", "confidence": 0.8}
//! ```

mod chunk;
mod command;
mod dispatch;
mod error;
mod gates;
mod result;

pub use chunk::{ChunkBuffer, ChunkConfig};
pub use command::{CommandRecognizer, Recognizer, RecognizerConfig};
pub use dispatch::dispatch;
pub use error::RecognizerError;
pub use gates::{Blocked, DispatchGates};
pub use result::{parse_output, Recognition};
