//! Audio engine for Ostinato - loop playback with decoupled tempo and pitch
//!
//! This crate provides the core audio processing pipeline:
//! - SignalGraph: player -> pitch shifter -> analysis tap, replaced wholesale per source
//! - Transport: play/pause state machine with two-phase start
//! - OutputContext: cpal output stream, activated on first playback start
//! - params: percentage controls mapped to playback rate and semitones

mod analysis;
mod engine;
mod graph;
mod output;
pub mod params;
mod pitch;
mod player;
mod source;
mod transport;

pub use analysis::{TapHandle, TAP_SIZE};
pub use engine::{AudioCommand, AudioEngine, AudioEvent, EngineSnapshot, EngineState};
pub use graph::SignalGraph;
pub use output::{AudioError, OutputContext};
pub use params::{pitch_semitones, tempo_rate, ControlPercent};
pub use pitch::PitchShifter;
pub use player::PlayerNode;
pub use source::AudioSource;
pub use transport::{PlaybackState, ToggleAction, Transport};
