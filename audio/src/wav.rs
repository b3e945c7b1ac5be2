//! Uncompressed PCM WAV container encoding.
//!
//! Produces the canonical 44-byte RIFF/WAVE header followed by the sample
//! data, so a chunk of captured frames can be handed to an external tool
//! as a self-contained file.

use crate::error::AudioError;
use crate::pcm::Format;
use std::io::Write;

/// Size of the RIFF/WAVE header written by [`write_header`].
pub const HEADER_LEN: usize = 44;

const PCM_FORMAT_CODE: u16 = 1;
const FMT_CHUNK_SIZE: u32 = 16;

/// Writes the RIFF/WAVE header for `data_len` bytes of PCM in `format`.
pub fn write_header<W: Write>(w: &mut W, format: Format, data_len: usize) -> Result<(), AudioError> {
    let data_size = u32::try_from(data_len)
        .ok()
        .filter(|n| n.checked_add(36).is_some())
        .ok_or(AudioError::TooLarge(data_len))?;

    // RIFF header
    w.write_all(b"RIFF")?;
    w.write_all(&(36 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")?;

    // fmt chunk
    w.write_all(b"fmt ")?;
    w.write_all(&FMT_CHUNK_SIZE.to_le_bytes())?;
    w.write_all(&PCM_FORMAT_CODE.to_le_bytes())?;
    w.write_all(&format.channels().to_le_bytes())?;
    w.write_all(&format.sample_rate.to_le_bytes())?;
    w.write_all(&format.bytes_rate().to_le_bytes())?;
    w.write_all(&format.block_align().to_le_bytes())?;
    w.write_all(&format.depth().to_le_bytes())?;

    // data chunk
    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    Ok(())
}

/// Encodes PCM data into an in-memory WAV file.
pub fn encode(pcm: &[u8], format: Format) -> Result<Vec<u8>, AudioError> {
    let mut wav = Vec::with_capacity(HEADER_LEN + pcm.len());
    write_header(&mut wav, format, pcm.len())?;
    wav.extend_from_slice(pcm);
    Ok(wav)
}

/// Writes PCM data as a WAV file to any writer.
pub fn write_to<W: Write>(w: &mut W, pcm: &[u8], format: Format) -> Result<(), AudioError> {
    write_header(w, format, pcm.len())?;
    w.write_all(pcm)?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(buf: &[u8], off: usize) -> u16 {
        u16::from_le_bytes([buf[off], buf[off + 1]])
    }

    fn u32_at(buf: &[u8], off: usize) -> u32 {
        u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
    }

    #[test]
    fn header_fields_for_stereo_48k() {
        let pcm = vec![0u8; 3840];
        let wav = encode(&pcm, Format::STEREO_48K).unwrap();

        assert_eq!(wav.len(), HEADER_LEN + pcm.len());
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36 + 3840);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 2);
        assert_eq!(u32_at(&wav, 24), 48000);
        assert_eq!(u32_at(&wav, 28), 192000);
        assert_eq!(u16_at(&wav, 32), 4);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 3840);
    }

    #[test]
    fn header_fields_for_mono_16k() {
        let wav = encode(&[1, 2, 3, 4], Format::MONO_16K).unwrap();
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 28), 32000);
        assert_eq!(u16_at(&wav, 32), 2);
        assert_eq!(&wav[44..], &[1, 2, 3, 4]);
    }

    #[test]
    fn write_to_matches_encode() {
        let pcm: Vec<u8> = (0..=255).collect();
        let mut out = Vec::new();

        write_to(&mut out, &pcm, Format::STEREO_48K).unwrap();
        assert_eq!(out, encode(&pcm, Format::STEREO_48K).unwrap());
    }
}
