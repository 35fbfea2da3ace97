//! Application state management (Elm architecture)

use ostinato_audio::{AudioEvent, ControlPercent, PlaybackState, TapHandle, TAP_SIZE};
use ostinato_input::Mode;

/// Kind of message shown in the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Complete UI state, updated from audio events and input
pub struct AppState {
    pub playback: PlaybackState,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub tempo: ControlPercent,
    pub pitch: ControlPercent,
    pub track_name: Option<String>,

    pub mode: Mode,
    pub command_buffer: String,
    pub message: Option<String>,
    pub message_type: MessageType,
    pub show_help: bool,
    /// Frame counter for animations
    pub frame_count: u64,

    /// Reader for the current graph's analysis tap, if any
    tap: Option<TapHandle>,
    /// Reusable per-frame snapshot of the tap window
    scope_frame: Vec<f32>,
    scope_valid: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            playback: PlaybackState::Idle,
            position_secs: 0.0,
            duration_secs: 0.0,
            tempo: ControlPercent::default(),
            pitch: ControlPercent::default(),
            track_name: None,
            mode: Mode::Normal,
            command_buffer: String::new(),
            message: None,
            message_type: MessageType::Info,
            show_help: false,
            frame_count: 0,
            tap: None,
            scope_frame: Vec::with_capacity(TAP_SIZE),
            scope_valid: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_audio_event(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::StateUpdate(snapshot) => {
                self.playback = snapshot.playback;
                self.position_secs = snapshot.position_secs;
                self.duration_secs = snapshot.duration_secs;
                self.tempo = snapshot.tempo;
                self.pitch = snapshot.pitch;
                self.track_name = snapshot.track_name;
            }
            AudioEvent::SourceInstalled { name, tap } => {
                self.tap = Some(tap);
                self.set_success(format!(
                    "Loaded: {}",
                    name.as_deref().unwrap_or("untitled")
                ));
            }
            AudioEvent::Error(msg) => {
                self.set_error(msg);
            }
            // EngineReady is consumed by the app main loop before events
            // reach here (see ostinato-app/src/main.rs); nothing to display.
            AudioEvent::EngineReady { .. } => {}
        }
    }

    /// Sample the analysis tap for this frame.
    ///
    /// Runs every tick regardless of playback state. A handle whose graph
    /// has been disposed yields nothing and is dropped here, so no reader
    /// outlives its graph; the scope then falls back to an idle line.
    pub fn sample_scope(&mut self) {
        let Some(tap) = self.tap.as_ref() else {
            self.scope_valid = false;
            return;
        };
        if tap.snapshot(&mut self.scope_frame) {
            self.scope_valid = true;
        } else {
            self.tap = None;
            self.scope_valid = false;
        }
    }

    /// The current frame's tap window, if one was sampled
    pub fn scope_frame(&self) -> Option<&[f32]> {
        self.scope_valid.then_some(self.scope_frame.as_slice())
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Info;
    }

    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Success;
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Warning;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Error;
    }
}

/// Top-level application handle
pub struct App {
    pub state: AppState,
    pub should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostinato_audio::{AudioSource, EngineState};
    use std::sync::Arc;

    #[test]
    fn test_scope_empty_until_source_installed() {
        let mut state = AppState::new();
        state.sample_scope();
        assert!(state.scope_frame().is_none());
    }

    #[test]
    fn test_scope_samples_after_install() {
        // The engine (and its graph) must outlive the tap for it to yield
        let mut engine = EngineState::new(48000);
        let source = AudioSource::new(Arc::new(vec![0.0; 1024]), 48000, Some("t".into()));
        let (_, tap) = engine.install_source(source);

        let mut state = AppState::new();
        state.handle_audio_event(AudioEvent::SourceInstalled {
            name: Some("clip".into()),
            tap,
        });
        state.sample_scope();
        let frame = state.scope_frame().expect("tap should yield a frame");
        assert_eq!(frame.len(), TAP_SIZE);
        assert_eq!(state.message_type, MessageType::Success);
    }

    #[test]
    fn test_dead_tap_dropped_on_sample() {
        let mut state = AppState::new();
        let tap = {
            let mut engine = EngineState::new(48000);
            let source = AudioSource::new(Arc::new(vec![0.0; 1024]), 48000, None);
            let (_, tap) = engine.install_source(source);
            engine.teardown();
            tap
        };
        state.handle_audio_event(AudioEvent::SourceInstalled { name: None, tap });
        state.sample_scope();
        assert!(state.scope_frame().is_none());
        // Next frame must not try the dead handle again
        state.sample_scope();
        assert!(state.scope_frame().is_none());
    }
}
