//! Output backends for the synthesis core.
//!
//! `OutputStream` runs a `SynthCore` inside a cpal callback on the default
//! output device. `OfflineRenderer` runs the same core without a device,
//! advancing the engine clock by exact sample counts - this is what the
//! engine tests drive, and it doubles as a deterministic bounce path.

use super::synth::SynthCore;
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, Stream, StreamConfig};

/// Live audio output: a cpal stream that owns the synthesis core.
///
/// The stream keeps playing for the lifetime of this handle; an idle core
/// renders silence. Dropping the handle stops the callback and releases
/// every voice with it.
pub struct OutputStream {
    _stream: Stream,
    sample_rate: f32,
}

impl OutputStream {
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Query the default output device's sample rate without opening a stream
pub fn default_sample_rate() -> Result<f32> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;
    let config = device.default_output_config()?;
    Ok(config.sample_rate().0 as f32)
}

/// Open the default output device and start rendering the given core
pub fn open_stream(core: SynthCore) -> Result<OutputStream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;
    let config = device.default_output_config()?;

    let sample_format = config.sample_format();
    let config: StreamConfig = config.into();
    let sample_rate = config.sample_rate.0 as f32;

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, core)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, core)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, core)?,
        _ => return Err(anyhow!("Unsupported sample format: {:?}", sample_format)),
    };
    stream.play()?;

    Ok(OutputStream {
        _stream: stream,
        sample_rate,
    })
}

fn build_stream<T>(device: &cpal::Device, config: &StreamConfig, mut core: SynthCore) -> Result<Stream>
where
    T: Sample + SizedSample + Send + 'static + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    // Mono scratch buffer, reused across callbacks; only grows
    let mut scratch: Vec<f32> = Vec::new();

    let err_fn = |err| eprintln!("an error occurred on the output audio stream: {:?}", err);

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels;
                scratch.resize(frames, 0.0);
                core.render(&mut scratch);

                for (frame, &mono) in data.chunks_mut(channels).zip(scratch.iter()) {
                    let value: T = cpal::Sample::from_sample(mono);
                    for sample in frame.iter_mut() {
                        *sample = value;
                    }
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| anyhow!("Failed to build output stream: {}", e))?;

    Ok(stream)
}

/// Device-free backend: renders on demand instead of from a callback.
pub struct OfflineRenderer {
    core: SynthCore,
}

impl OfflineRenderer {
    pub fn new(core: SynthCore) -> Self {
        Self { core }
    }

    pub fn sample_rate(&self) -> f32 {
        self.core.sample_rate()
    }

    /// Advance the engine clock by exactly `secs` worth of samples and
    /// return the rendered mono buffer.
    pub fn render_secs(&mut self, secs: f64) -> Vec<f32> {
        let frames = (secs * self.core.sample_rate() as f64).round() as usize;
        let mut buf = vec![0.0; frames];
        self.core.render(&mut buf);
        buf
    }
}
