//! Default-microphone capture for a single dictation utterance.
//!
//! [`Recording::start`] opens the default input device and forwards mono
//! [`MonoFrame`]s over an mpsc channel until the [`Recording`] is dropped.
//! A cpal stream is not `Send` on every platform, so a recording must be
//! dropped on the thread that started it.

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use super::resample::downmix;

/// Mono samples at the device's native rate.
#[derive(Debug, Clone)]
pub struct MonoFrame {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

#[derive(Debug, Error)]
pub enum MicError {
    #[error("no microphone available")]
    NoMicrophone,

    #[error("microphone config unavailable: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("cannot open microphone stream: {0}")]
    Open(#[from] cpal::BuildStreamError),

    #[error("cannot start microphone: {0}")]
    Start(#[from] cpal::PlayStreamError),
}

/// `true` when the default host exposes an input device.
pub fn has_input_device() -> bool {
    cpal::default_host().default_input_device().is_some()
}

/// A live microphone stream.  Capture stops when this is dropped.
pub struct Recording {
    _stream: cpal::Stream,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Recording {
    /// Start recording from the default input device.  Frames are downmixed
    /// in the audio callback; send failures after the receiver hangs up are
    /// ignored.
    pub fn start(frames: mpsc::Sender<MonoFrame>) -> Result<Self, MicError> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or(MicError::NoMicrophone)?;
        let supported = device.default_input_config()?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        let config: cpal::StreamConfig = supported.into();

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = frames.send(MonoFrame {
                    samples: downmix(data, channels),
                    sample_rate,
                });
            },
            |err| log::error!("dictation: microphone stream error: {err}"),
            None,
        )?;
        stream.play()?;

        Ok(Self {
            _stream: stream,
            sample_rate,
            channels,
        })
    }
}
