//! Audio engine - command handling and the shared session state

use crate::analysis::TapHandle;
use crate::graph::SignalGraph;
use crate::params::{self, ControlPercent};
use crate::source::AudioSource;
use crate::transport::{PlaybackState, ToggleAction, Transport};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Commands sent to the audio control thread
#[derive(Debug, Clone)]
pub enum AudioCommand {
    /// A load request went out; reflect Loading in the transport
    BeginLoad,
    /// Install a freshly decoded source, replacing any current graph
    InstallSource(AudioSource),
    /// The in-flight load failed
    LoadFailed(String),
    TogglePlayPause,
    SetTempoPercent(ControlPercent),
    SetPitchPercent(ControlPercent),
    Shutdown,
}

/// Session state for UI rendering
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    pub playback: PlaybackState,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub tempo: ControlPercent,
    pub pitch: ControlPercent,
    pub track_name: Option<String>,
}

/// Events sent from the audio control thread
#[derive(Debug, Clone)]
pub enum AudioEvent {
    /// The control thread opened the output device; loads should resample
    /// to this rate
    EngineReady { sample_rate: u32 },
    /// Periodic state update for UI rendering
    StateUpdate(EngineSnapshot),
    /// A new source's graph is live; the handle feeds the visualizer
    SourceInstalled {
        name: Option<String>,
        tap: TapHandle,
    },
    /// Error surfaced to the user
    Error(String),
}

/// Engine state (held behind a mutex shared with the audio callback)
pub struct EngineState {
    /// The single live graph; swapped wholesale on source change
    graph: Option<SignalGraph>,
    transport: Transport,
    tempo: ControlPercent,
    pitch: ControlPercent,
    sample_rate: u32,
}

impl EngineState {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            graph: None,
            transport: Transport::new(),
            tempo: ControlPercent::default(),
            pitch: ControlPercent::default(),
            sample_rate,
        }
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.transport.state()
    }

    /// Handle every command that stays inside the state lock.
    ///
    /// TogglePlayPause and Shutdown are handled by the control loop: the
    /// former may need to activate the output stream, which must happen
    /// outside this lock.
    pub fn handle_command(&mut self, cmd: AudioCommand) -> Option<AudioEvent> {
        match cmd {
            AudioCommand::BeginLoad => {
                self.transport.begin_load();
                None
            }
            AudioCommand::InstallSource(source) => {
                let (name, tap) = self.install_source(source);
                Some(AudioEvent::SourceInstalled { name, tap })
            }
            AudioCommand::LoadFailed(reason) => {
                self.transport.load_failed();
                Some(AudioEvent::Error(reason))
            }
            AudioCommand::SetTempoPercent(percent) => {
                self.set_tempo(percent);
                None
            }
            AudioCommand::SetPitchPercent(percent) => {
                self.set_pitch(percent);
                None
            }
            AudioCommand::TogglePlayPause | AudioCommand::Shutdown => None,
        }
    }

    /// Replace the current graph with one built from `source`.
    ///
    /// The old graph is fully disposed before the new one is stored, inside
    /// the caller's critical section, so no observer sees a half-built
    /// chain. Current tempo/pitch settings are applied to the fresh graph
    /// immediately.
    pub fn install_source(&mut self, source: AudioSource) -> (Option<String>, TapHandle) {
        if let Some(mut old) = self.graph.take() {
            old.dispose();
        }

        let name = source.name().map(str::to_owned);
        let mut graph = SignalGraph::build(source, self.sample_rate);
        graph.set_playback_rate(params::tempo_rate(self.tempo));
        graph.set_pitch_shift(params::pitch_semitones(self.pitch));
        let tap = graph.tap_handle();

        self.graph = Some(graph);
        self.transport.load_ready();
        tracing::info!(track = name.as_deref().unwrap_or("<unnamed>"), "source installed");
        (name, tap)
    }

    /// First half of a play/pause flip; see [`Transport::toggle_play_pause`]
    pub fn toggle_play_pause(&mut self) -> ToggleAction {
        if self.graph.is_none() {
            return ToggleAction::Ignored;
        }
        let action = self.transport.toggle_play_pause();
        if action == ToggleAction::Paused {
            if let Some(graph) = self.graph.as_mut() {
                graph.stop();
            }
        }
        action
    }

    /// Output activation succeeded; start the player and report Playing
    pub fn confirm_start(&mut self) {
        self.transport.confirm_start();
        if self.transport.is_playing() {
            if let Some(graph) = self.graph.as_mut() {
                graph.start();
            }
        }
    }

    /// Output activation failed; playback state stays where it was
    pub fn abort_start(&mut self) {
        self.transport.abort_start();
    }

    /// Lazily-applied tempo: a no-op on the graph until one exists
    pub fn set_tempo(&mut self, percent: ControlPercent) {
        self.tempo = percent;
        if let Some(graph) = self.graph.as_mut() {
            graph.set_playback_rate(params::tempo_rate(percent));
        }
    }

    /// Lazily-applied pitch: a no-op on the graph until one exists
    pub fn set_pitch(&mut self, percent: ControlPercent) {
        self.pitch = percent;
        if let Some(graph) = self.graph.as_mut() {
            graph.set_pitch_shift(params::pitch_semitones(percent));
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            playback: self.transport.state(),
            position_secs: self.graph.as_ref().map_or(0.0, SignalGraph::position_secs),
            duration_secs: self.graph.as_ref().map_or(0.0, SignalGraph::duration_secs),
            tempo: self.tempo,
            pitch: self.pitch,
            track_name: self
                .graph
                .as_ref()
                .and_then(|g| g.track_name().map(str::to_owned)),
        }
    }

    /// Fill an output block; silence when no graph is installed
    pub fn process(&mut self, output: &mut [f32]) {
        match self.graph.as_mut() {
            Some(graph) => graph.process(output),
            None => output.fill(0.0),
        }
    }

    /// Session teardown: dispose the graph and reset the transport
    pub fn teardown(&mut self) {
        if let Some(mut graph) = self.graph.take() {
            graph.dispose();
        }
        self.transport.clear();
    }
}

/// Handle to communicate with the audio control thread
pub struct AudioEngine {
    /// Send commands to the audio control thread
    pub command_tx: Sender<AudioCommand>,
    /// Receive events from the audio control thread
    pub event_rx: Receiver<AudioEvent>,
    /// Shutdown flag
    shutdown: Arc<AtomicBool>,
}

impl AudioEngine {
    /// Create channels for engine communication
    ///
    /// Buffer size of 256 provides headroom for command bursts without
    /// saturation.
    #[allow(clippy::type_complexity)]
    pub fn create_channels() -> (
        Sender<AudioCommand>,
        Receiver<AudioCommand>,
        Sender<AudioEvent>,
        Receiver<AudioEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(256);
        let (evt_tx, evt_rx) = bounded(256);
        (cmd_tx, cmd_rx, evt_tx, evt_rx)
    }

    pub fn new(command_tx: Sender<AudioCommand>, event_rx: Receiver<AudioEvent>) -> Self {
        Self {
            command_tx,
            event_rx,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Send a command to the audio control thread
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.command_tx.try_send(cmd);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = self.command_tx.try_send(AudioCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_source(name: &str) -> AudioSource {
        AudioSource::new(
            Arc::new(vec![0.25; 48000]),
            48000,
            Some(name.to_string()),
        )
    }

    #[test]
    fn test_setters_are_noops_without_graph() {
        let mut state = EngineState::new(48000);
        state.set_tempo(ControlPercent::new(150));
        state.set_pitch(ControlPercent::new(75));

        let snap = state.snapshot();
        assert_eq!(snap.tempo.get(), 150);
        assert_eq!(snap.pitch.get(), 75);
        assert_eq!(snap.playback, PlaybackState::Idle);
    }

    #[test]
    fn test_toggle_without_graph_ignored() {
        let mut state = EngineState::new(48000);
        assert_eq!(state.toggle_play_pause(), ToggleAction::Ignored);
    }

    #[test]
    fn test_install_supersedes_previous_graph() {
        let mut state = EngineState::new(48000);
        let (_, first_tap) = state.install_source(test_source("first"));
        assert!(first_tap.is_alive());

        let (name, second_tap) = state.install_source(test_source("second"));
        assert_eq!(name.as_deref(), Some("second"));
        assert!(!first_tap.is_alive());
        assert!(second_tap.is_alive());
        assert_eq!(state.snapshot().track_name.as_deref(), Some("second"));
    }

    #[test]
    fn test_pending_settings_apply_on_install() {
        let mut state = EngineState::new(48000);
        state.set_tempo(ControlPercent::new(200));
        state.install_source(test_source("clip"));

        // Rate 2.0: 0.1s of output advances the source position by 0.2s
        state.transport_start_for_test();
        let mut out = vec![0.0f32; 9600];
        state.process(&mut out);
        let snap = state.snapshot();
        assert!((snap.position_secs - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_teardown_invalidates_tap() {
        let mut state = EngineState::new(48000);
        let (_, tap) = state.install_source(test_source("clip"));
        state.teardown();
        assert!(!tap.is_alive());
        assert_eq!(state.playback_state(), PlaybackState::Idle);
    }

    #[test]
    fn test_process_without_graph_is_silent() {
        let mut state = EngineState::new(48000);
        let mut out = vec![0.5f32; 128];
        state.process(&mut out);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    impl EngineState {
        /// Drive the two-phase start without an output device
        fn transport_start_for_test(&mut self) {
            assert_eq!(self.toggle_play_pause(), ToggleAction::StartRequested);
            self.confirm_start();
        }
    }
}
