//! PCM audio format definitions.

use serde::{Deserialize, Serialize};

/// Describes a signed 16-bit little-endian interleaved PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    /// Sample rate in Hz (e.g., 16000, 48000).
    pub sample_rate: u32,
    /// True for stereo (2 channels), false for mono (1 channel).
    pub stereo: bool,
}

impl Format {
    /// Creates a new format with the given sample rate and mono audio.
    pub const fn mono(sample_rate: u32) -> Self {
        Self { sample_rate, stereo: false }
    }

    /// Creates a new format with the given sample rate and stereo audio.
    pub const fn stereo(sample_rate: u32) -> Self {
        Self { sample_rate, stereo: true }
    }

    /// Returns the number of channels (1 for mono, 2 for stereo).
    pub fn channels(&self) -> u16 {
        if self.stereo { 2 } else { 1 }
    }

    /// Returns the bit depth of a single sample.
    pub fn depth(&self) -> u16 {
        16
    }

    /// Returns the number of bytes per sample frame (all channels).
    pub fn block_align(&self) -> u16 {
        self.channels() * self.depth() / 8
    }

    /// Returns the number of bytes per second.
    pub fn bytes_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

// Common format presets
impl Format {
    /// 16kHz mono
    pub const MONO_16K: Format = Format::mono(16000);
    /// 48kHz stereo, the decoded voice-channel format.
    pub const STEREO_48K: Format = Format::stereo(48000);
}

impl Default for Format {
    fn default() -> Self {
        Format::STEREO_48K
    }
}

/// Iterates over the signed 16-bit little-endian samples of a frame.
/// A trailing odd byte is ignored.
pub fn samples(frame: &[u8]) -> impl Iterator<Item = i16> + '_ {
    frame
        .chunks_exact(2)
        .map(|bytes| i16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Encodes samples as signed 16-bit little-endian bytes.
pub fn to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_properties() {
        let format = Format::STEREO_48K;
        assert_eq!(format.sample_rate, 48000);
        assert_eq!(format.channels(), 2);
        assert_eq!(format.depth(), 16);
        assert_eq!(format.block_align(), 4);
        assert_eq!(format.bytes_rate(), 192000);
    }

    #[test]
    fn test_samples_roundtrip_ignores_odd_byte() {
        let mut data = to_bytes(&[1000, -2000, i16::MIN, i16::MAX]);
        data.push(0x7f);
        let decoded: Vec<i16> = samples(&data).collect();
        assert_eq!(decoded, vec![1000, -2000, i16::MIN, i16::MAX]);
    }
}
