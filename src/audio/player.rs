use rodio::{OutputStream, OutputStreamHandle, Sink, buffer::SamplesBuffer};

use log::debug;

use crate::config::AudioConfig;
use crate::error::{PianoError, Result};

/// Somewhere mono sample buffers can be sent to be heard.
pub trait AudioOutput {
    fn play(&mut self, samples: &[f32], sample_rate: u32) -> Result<()>;
}

/// Plays through the default output device, blocking until each buffer ends.
pub struct RodioOutput {
    // Dropping the stream closes the device.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    volume: f32,
    sound_enabled: bool,
}

impl RodioOutput {
    pub fn try_default(config: &AudioConfig) -> Result<Self> {
        let (stream, handle) = OutputStream::try_default().map_err(|err| PianoError::Audio(err.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
            volume: config.volume.clamp(0.0, 1.0),
            sound_enabled: config.sound_enabled,
        })
    }
}

impl AudioOutput for RodioOutput {
    fn play(&mut self, samples: &[f32], sample_rate: u32) -> Result<()> {
        if !self.sound_enabled || samples.is_empty() {
            return Ok(());
        }

        let sink = Sink::try_new(&self.handle).map_err(|err| PianoError::Audio(err.to_string()))?;
        sink.set_volume(self.volume);
        sink.append(SamplesBuffer::new(1, sample_rate, samples.to_vec()));
        debug!("Playing {} samples at {} Hz", samples.len(), sample_rate);
        sink.sleep_until_end();
        Ok(())
    }
}

/// Discards everything; for muted and headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn play(&mut self, _samples: &[f32], _sample_rate: u32) -> Result<()> {
        Ok(())
    }
}

impl<T: AudioOutput + ?Sized> AudioOutput for Box<T> {
    fn play(&mut self, samples: &[f32], sample_rate: u32) -> Result<()> {
        (**self).play(samples, sample_rate)
    }
}
