//! WAV encoding for 16-bit stereo PCM.

use smd_engine::Frame;
use std::io::{Cursor, Seek, Write};

fn spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Interleaved sample count for `frames`, if it fits a WAV data chunk.
fn sample_count(frames: usize) -> Result<u32, hound::Error> {
    frames
        .checked_mul(2)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(hound::Error::FormatError("too many frames for a WAV file"))
}

/// Write `frames` as an interleaved stereo WAV stream.
pub fn write_wav<W: Write + Seek>(
    w: W,
    frames: &[Frame],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let count = sample_count(frames.len())?;
    let mut writer = hound::WavWriter::new(w, spec(sample_rate))?;
    let mut samples = writer.get_i16_writer(count);
    for frame in frames {
        samples.write_sample(frame.left);
        samples.write_sample(frame.right);
    }
    samples.flush()?;
    writer.finalize()
}

/// Encode `frames` into an in-memory WAV file.
pub fn frames_to_wav(frames: &[Frame], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let mut buf = Cursor::new(Vec::new());
    write_wav(&mut buf, frames, sample_rate)?;
    Ok(buf.into_inner())
}
