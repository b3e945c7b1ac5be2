//! PCM (Pulse Code Modulation) audio format handling.
//!
//! - [`Format`]: sample rate and channel layout of a 16-bit PCM stream
//! - [`samples`]: decode a little-endian frame into `i16` samples
//! - [`to_bytes`]: encode `i16` samples into a little-endian frame

mod format;

pub use format::{samples, to_bytes, Format};
