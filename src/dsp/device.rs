//! Default output device via cpal. The stream pulls mono blocks from the
//! shared [`AudioContext`] and copies them to every device channel.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::AudioError;

use super::context::AudioContext;
use super::output::check_sample_rate;

/// Keeps the device stream alive for as long as the output is open.
pub struct DeviceStream {
    _stream: cpal::Stream,
}

/// Open the host's default output device and start pulling from a new context.
pub fn open_default(master_gain: f64) -> Result<(AudioContext, DeviceStream), AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AudioError::NoOutputDevice)?;

    let supported = device
        .default_output_config()
        .map_err(|e| AudioError::Stream(e.to_string()))?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(AudioError::UnsupportedFormat(format!(
            "{:?}",
            supported.sample_format()
        )));
    }

    let config: cpal::StreamConfig = supported.into();
    check_sample_rate(config.sample_rate.0)?;
    let channels = config.channels.max(1) as usize;
    let context = AudioContext::new(config.sample_rate.0, master_gain);

    log::info!(
        "Audio: {} @ {}Hz, {} channel(s)",
        device.name().unwrap_or_else(|_| "Unknown".to_string()),
        config.sample_rate.0,
        channels
    );

    let render_ctx = context.clone();
    let mut mono = Vec::<f32>::new();
    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels;
                mono.resize(frames, 0.0);
                render_ctx.render_into(&mut mono);
                for (frame, &sample) in data.chunks_mut(channels).zip(&mono) {
                    frame.fill(sample);
                }
            },
            |err| log::error!("Audio stream error: {err}"),
            None,
        )
        .map_err(|e| AudioError::Stream(e.to_string()))?;

    stream
        .play()
        .map_err(|e| AudioError::Stream(e.to_string()))?;

    Ok((context, DeviceStream { _stream: stream }))
}
