//! Command definitions for Ostinato

use std::path::PathBuf;

/// Commands that can be dispatched from input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Playback
    TogglePlayPause,

    // Controls (percentage deltas, clamped by the engine)
    AdjustTempo(i32),
    AdjustPitch(i32),
    /// Snap both controls back to 100%
    ResetControls,

    // Loading
    LoadTrack(PathBuf),

    // UI
    ToggleHelp,
    Quit,

    // Mode changes
    EnterCommandMode,
    EnterNormalMode,
    /// Unrecognized command-line input, surfaced for an error message
    ExecuteCommand(String),
    Cancel,
}
