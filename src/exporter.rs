use std::io::{Seek, Write};
use std::path::Path;

use hound::{WavSpec, WavWriter};

use crate::error::Error;

/// on-disk sample encoding for the pcm container
#[derive(Clone, Copy, Debug)]
pub enum SampleFormat {
    /// 16-bit signed integer, format tag 1
    Int16,
    /// 32-bit ieee float, format tag 3
    Float32,
}

impl SampleFormat {
    fn wav_spec(&self, channels: u16, samplerate: u32) -> WavSpec {
        let (bits_per_sample, sample_format) = match self {
            SampleFormat::Int16 => (16, hound::SampleFormat::Int),
            SampleFormat::Float32 => (32, hound::SampleFormat::Float),
        };
        WavSpec {
            channels,
            sample_rate: samplerate,
            bits_per_sample,
            sample_format,
        }
    }
}

/// write channel buffers as a linear-pcm wave file, interleaving
/// the frames on the way out.
pub fn write_wav<W: Write + Seek>(
    out: W,
    channels: &[&[f32]],
    samplerate: u32,
    format: SampleFormat,
) -> Result<(), Error> {
    if channels.is_empty() {
        return Err(Error::MalformedData("no channels to export".to_string()));
    }
    let frames = channels[0].len();
    if channels.iter().any(|ch| ch.len() != frames) {
        return Err(Error::ChannelLengthMismatch);
    }

    let spec = format.wav_spec(channels.len() as u16, samplerate);
    let mut writer = WavWriter::new(out, spec)?;

    for frame in 0..frames {
        for channel in channels {
            match format {
                SampleFormat::Int16 => {
                    // clamp onto the 16-bit resolution, hound passes
                    // out-of-range samples through unchecked
                    let scaled = (channel[frame] * 32768.0).floor().clamp(-32768.0, 32767.0);
                    writer.write_sample(scaled as i16)?;
                }
                SampleFormat::Float32 => {
                    writer.write_sample(channel[frame])?;
                }
            }
        }
    }

    // finalize patches the riff and data chunk sizes in the header
    writer.finalize()?;
    Ok(())
}

/// convenience wrapper writing straight to a file path
pub fn write_wav_file<P: AsRef<Path>>(
    path: P,
    channels: &[&[f32]],
    samplerate: u32,
    format: SampleFormat,
) -> Result<(), Error> {
    let file = std::fs::File::create(path)?;
    write_wav(std::io::BufWriter::new(file), channels, samplerate, format)
}

// TEST TEST TEST
#[cfg(test)]
mod tests {
    // Note this useful idiom: importing names from outer (for mod tests) scope.
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(channels: &[&[f32]], samplerate: u32, format: SampleFormat) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        write_wav(&mut cursor, channels, samplerate, format).unwrap();
        cursor.into_inner()
    }

    /// walk the riff chunk list, returns the payload offset and size
    fn find_chunk(bytes: &[u8], id: &[u8; 4]) -> (usize, usize) {
        let mut pos = 12;
        while pos + 8 <= bytes.len() {
            let size = u32::from_le_bytes([
                bytes[pos + 4],
                bytes[pos + 5],
                bytes[pos + 6],
                bytes[pos + 7],
            ]) as usize;
            if &bytes[pos..pos + 4] == id {
                return (pos + 8, size);
            }
            pos += 8 + size + (size & 1);
        }
        panic!("chunk {:?} not found", id);
    }

    #[test]
    fn test_header_layout_float32() {
        let left = [0.5f32, -0.5];
        let right = [1.0f32, 0.0];
        let bytes = wav_bytes(&[&left, &right], 44100, SampleFormat::Float32);

        assert!(&bytes[0..4] == b"RIFF");
        assert!(&bytes[8..12] == b"WAVE");

        // format tag 3, 2 channels, 32 bits
        let (fmt, _) = find_chunk(&bytes, b"fmt ");
        assert!(u16::from_le_bytes([bytes[fmt], bytes[fmt + 1]]) == 3);
        assert!(u16::from_le_bytes([bytes[fmt + 2], bytes[fmt + 3]]) == 2);
        assert!(
            u32::from_le_bytes([bytes[fmt + 4], bytes[fmt + 5], bytes[fmt + 6], bytes[fmt + 7]])
                == 44100
        );
        assert!(u16::from_le_bytes([bytes[fmt + 14], bytes[fmt + 15]]) == 32);

        // first frame, interleaved l/r, bit-exact
        let (data, data_bytes) = find_chunk(&bytes, b"data");
        assert!(data_bytes == 2 * 2 * 4);
        let l0 = f32::from_le_bytes([
            bytes[data],
            bytes[data + 1],
            bytes[data + 2],
            bytes[data + 3],
        ]);
        let r0 = f32::from_le_bytes([
            bytes[data + 4],
            bytes[data + 5],
            bytes[data + 6],
            bytes[data + 7],
        ]);
        assert!(l0 == 0.5);
        assert!(r0 == 1.0);
    }

    #[test]
    fn test_int16_scaling_and_clamping() {
        let samples = [0.5f32, 1.5, -1.5, -1.0];
        let bytes = wav_bytes(&[&samples], 48000, SampleFormat::Int16);

        // integer pcm keeps the canonical 44-byte header
        let (fmt, fmt_bytes) = find_chunk(&bytes, b"fmt ");
        assert!(fmt == 20 && fmt_bytes == 16);
        assert!(u16::from_le_bytes([bytes[fmt], bytes[fmt + 1]]) == 1);
        assert!(u16::from_le_bytes([bytes[fmt + 14], bytes[fmt + 15]]) == 16);

        let (data, data_bytes) = find_chunk(&bytes, b"data");
        assert!(data == 44 && data_bytes == 8);
        let read = |i: usize| i16::from_le_bytes([bytes[data + 2 * i], bytes[data + 2 * i + 1]]);
        assert!(read(0) == 16384);
        assert!(read(1) == 32767); // clamped
        assert!(read(2) == -32768); // clamped
        assert!(read(3) == -32768);
    }

    #[test]
    fn test_ragged_channels_rejected() {
        let left = [0.0f32; 4];
        let right = [0.0f32; 3];
        let mut cursor = Cursor::new(Vec::new());
        let result = write_wav(&mut cursor, &[&left, &right], 44100, SampleFormat::Int16);
        assert!(matches!(result, Err(Error::ChannelLengthMismatch)));
    }
}
