//! WAV renderer — renders toots offline to a WAV byte buffer.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::AudioError;
use crate::toot::TootParams;

use super::context::AudioContext;
use super::output::check_sample_rate;

/// Render a single toot to a WAV file as bytes (16-bit stereo PCM).
///
/// `seed` fixes the per-call jitter so the same arguments give the same file.
pub fn render_toot_wav(
    params: &TootParams,
    sample_rate: u32,
    seed: u64,
) -> Result<Vec<u8>, AudioError> {
    check_sample_rate(sample_rate)?;
    let ctx = AudioContext::new(sample_rate, 1.0);
    ctx.schedule(params.resolve().plan(&mut StdRng::seed_from_u64(seed)));
    let frames = ctx.frames_remaining() as usize;
    let samples = ctx.render(frames);
    Ok(encode_wav_from_mono(&samples, sample_rate))
}

/// Encode mono f32 samples as a 16-bit stereo WAV (both channels equal).
pub fn encode_wav_from_mono(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let mut stereo = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        let sample = (s as f64 * 32767.0).round().clamp(-32768.0, 32767.0) as i16;
        stereo.push(sample); // L
        stereo.push(sample); // R
    }
    encode_wav(&stereo, sample_rate, 2)
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
