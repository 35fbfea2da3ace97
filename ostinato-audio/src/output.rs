//! Output context - cpal device and stream lifecycle
//!
//! The process-wide output sink, held by the audio control thread. The
//! device and config are probed up front (the engine needs the sample rate
//! before any graph exists), but the stream itself is built and started on
//! the first playback start. `shutdown` drops the stream; `activate` after
//! that rebuilds it.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::engine::EngineState;

/// Output activation failures
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoOutputDevice,
    #[error("failed to query output config: {0}")]
    StreamConfig(String),
    #[error("failed to build output stream: {0}")]
    StreamBuild(String),
    #[error("failed to start output stream: {0}")]
    StreamStart(String),
}

pub struct OutputContext {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
    stream: Option<cpal::Stream>,
}

impl OutputContext {
    /// Probe the default host for an output device and config
    pub fn open() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let config = device
            .default_output_config()
            .map_err(|e| AudioError::StreamConfig(e.to_string()))?;
        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate().0
    }

    pub fn channels(&self) -> usize {
        self.config.channels() as usize
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Build and start the output stream on first use; later calls are no-ops.
    ///
    /// The callback pulls blocks from the shared engine state with try_lock:
    /// on contention it outputs silence rather than blocking the real-time
    /// thread.
    pub fn activate(&mut self, state: Arc<Mutex<EngineState>>) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let channels = self.channels();
        // Pre-allocated buffer for downmixing when the device is not stereo
        let mut stereo_buffer = vec![0.0f32; 16384];

        let stream = self
            .device
            .build_output_stream(
                &self.config.clone().into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if let Ok(mut state) = state.try_lock() {
                        if channels == 2 {
                            state.process(data);
                        } else {
                            let stereo_len = data.len() * 2;
                            let stereo = &mut stereo_buffer[..stereo_len];
                            state.process(stereo);
                            for (i, sample) in data.iter_mut().enumerate() {
                                *sample = (stereo[i * 2] + stereo[i * 2 + 1]) * 0.5;
                            }
                        }
                    } else {
                        data.fill(0.0);
                    }
                },
                |err| {
                    tracing::error!("audio stream error: {err}");
                },
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamStart(e.to_string()))?;

        tracing::info!(
            sample_rate = self.sample_rate(),
            channels,
            "output stream activated"
        );
        self.stream = Some(stream);
        Ok(())
    }

    /// Drop the stream; a later activate rebuilds it
    pub fn shutdown(&mut self) {
        self.stream = None;
    }
}
