//! Transport controller - playback state machine

/// Playback lifecycle for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No source loaded
    #[default]
    Idle,
    /// A load request is in flight
    Loading,
    /// Source installed, not playing
    Ready,
    Playing,
    Paused,
}

/// Outcome of a play/pause toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// Caller must activate the output context, then confirm or abort
    StartRequested,
    /// Playback was stopped
    Paused,
    /// Nothing to do in the current state
    Ignored,
}

/// The only component allowed to mutate play/pause state.
///
/// Starting is two-phase because output activation can fail: `toggle` marks
/// a start pending, and only `confirm_start` reports Playing. A second
/// toggle while a start is pending is ignored.
#[derive(Debug, Default)]
pub struct Transport {
    state: PlaybackState,
    start_pending: bool,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// A load request went out; any previous source is being superseded
    pub fn begin_load(&mut self) {
        self.state = PlaybackState::Loading;
        self.start_pending = false;
    }

    /// A source was installed; playback must be requested explicitly
    pub fn load_ready(&mut self) {
        self.state = PlaybackState::Ready;
        self.start_pending = false;
    }

    /// The in-flight load failed; back to no source
    pub fn load_failed(&mut self) {
        self.state = PlaybackState::Idle;
        self.start_pending = false;
    }

    /// Session teardown
    pub fn clear(&mut self) {
        self.state = PlaybackState::Idle;
        self.start_pending = false;
    }

    /// Request a play/pause flip; no-op outside Ready/Playing/Paused
    pub fn toggle_play_pause(&mut self) -> ToggleAction {
        if self.start_pending {
            return ToggleAction::Ignored;
        }
        match self.state {
            PlaybackState::Ready | PlaybackState::Paused => {
                self.start_pending = true;
                ToggleAction::StartRequested
            }
            PlaybackState::Playing => {
                self.state = PlaybackState::Paused;
                ToggleAction::Paused
            }
            PlaybackState::Idle | PlaybackState::Loading => ToggleAction::Ignored,
        }
    }

    /// Output activation succeeded; the pending start becomes Playing
    pub fn confirm_start(&mut self) {
        if self.start_pending {
            self.state = PlaybackState::Playing;
            self.start_pending = false;
        }
    }

    /// Output activation failed; state stays at its pre-play value
    pub fn abort_start(&mut self) {
        self.start_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_ignored_without_source() {
        let mut transport = Transport::new();
        assert_eq!(transport.toggle_play_pause(), ToggleAction::Ignored);
        assert_eq!(transport.state(), PlaybackState::Idle);

        transport.begin_load();
        assert_eq!(transport.toggle_play_pause(), ToggleAction::Ignored);
        assert_eq!(transport.state(), PlaybackState::Loading);
    }

    #[test]
    fn test_play_pause_cycle() {
        let mut transport = Transport::new();
        transport.begin_load();
        transport.load_ready();

        assert_eq!(transport.toggle_play_pause(), ToggleAction::StartRequested);
        // Not playing until activation is confirmed
        assert_eq!(transport.state(), PlaybackState::Ready);
        transport.confirm_start();
        assert_eq!(transport.state(), PlaybackState::Playing);

        assert_eq!(transport.toggle_play_pause(), ToggleAction::Paused);
        assert_eq!(transport.state(), PlaybackState::Paused);

        assert_eq!(transport.toggle_play_pause(), ToggleAction::StartRequested);
        transport.confirm_start();
        assert_eq!(transport.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_no_second_start_while_pending() {
        let mut transport = Transport::new();
        transport.begin_load();
        transport.load_ready();

        assert_eq!(transport.toggle_play_pause(), ToggleAction::StartRequested);
        assert_eq!(transport.toggle_play_pause(), ToggleAction::Ignored);
    }

    #[test]
    fn test_abort_start_keeps_pre_play_state() {
        let mut transport = Transport::new();
        transport.begin_load();
        transport.load_ready();

        transport.toggle_play_pause();
        transport.abort_start();
        assert_eq!(transport.state(), PlaybackState::Ready);

        // Same from Paused
        transport.toggle_play_pause();
        transport.confirm_start();
        transport.toggle_play_pause();
        assert_eq!(transport.state(), PlaybackState::Paused);
        transport.toggle_play_pause();
        transport.abort_start();
        assert_eq!(transport.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_load_failure_returns_to_idle() {
        let mut transport = Transport::new();
        transport.begin_load();
        transport.load_failed();
        assert_eq!(transport.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_supersede_while_playing() {
        let mut transport = Transport::new();
        transport.begin_load();
        transport.load_ready();
        transport.toggle_play_pause();
        transport.confirm_start();

        // A new load while playing drops back through Loading to Ready
        transport.begin_load();
        assert_eq!(transport.state(), PlaybackState::Loading);
        transport.load_ready();
        assert_eq!(transport.state(), PlaybackState::Ready);
    }
}
