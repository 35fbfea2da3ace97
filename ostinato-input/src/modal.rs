//! Modal state machine for vim-style input handling

use crate::commands::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input modes (vim-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Command,
    Help,
}

impl Mode {
    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Command => "COMMAND",
            Mode::Help => "HELP",
        }
    }
}

/// Handles keyboard input and converts to commands
#[derive(Default)]
pub struct InputHandler {
    mode: Mode,
    command_buffer: String,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get current command buffer (for display)
    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    /// Handle a key event and return a command if applicable
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        match self.mode {
            Mode::Normal => self.handle_normal_mode(key),
            Mode::Command => self.handle_command_mode(key),
            Mode::Help => self.handle_help_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            // Mode switching
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.command_buffer.clear();
                Some(Command::EnterCommandMode)
            }
            KeyCode::Char('?') => {
                self.mode = Mode::Help;
                Some(Command::ToggleHelp)
            }

            // Transport
            KeyCode::Char(' ') => Some(Command::TogglePlayPause),

            // Tempo (1% steps, 10% with shifted keys)
            KeyCode::Char('[') => Some(Command::AdjustTempo(-1)),
            KeyCode::Char(']') => Some(Command::AdjustTempo(1)),
            KeyCode::Char('{') => Some(Command::AdjustTempo(-10)),
            KeyCode::Char('}') => Some(Command::AdjustTempo(10)),

            // Pitch (1% steps, 10% with shifted keys)
            KeyCode::Char('-') => Some(Command::AdjustPitch(-1)),
            KeyCode::Char('=') => Some(Command::AdjustPitch(1)),
            KeyCode::Char('_') => Some(Command::AdjustPitch(-10)),
            KeyCode::Char('+') => Some(Command::AdjustPitch(10)),

            // Back to neutral
            KeyCode::Char('0') => Some(Command::ResetControls),

            // Quit
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }

            KeyCode::Esc => Some(Command::Cancel),

            _ => None,
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => {
                let cmd = self.parse_command();
                self.mode = Mode::Normal;
                let buffer = std::mem::take(&mut self.command_buffer);
                cmd.or(Some(Command::ExecuteCommand(buffer)))
            }
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.command_buffer.clear();
                Some(Command::EnterNormalMode)
            }
            KeyCode::Backspace => {
                self.command_buffer.pop();
                if self.command_buffer.is_empty() {
                    self.mode = Mode::Normal;
                    Some(Command::EnterNormalMode)
                } else {
                    None
                }
            }
            KeyCode::Char(c) => {
                self.command_buffer.push(c);
                None
            }
            _ => None,
        }
    }

    fn handle_help_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                self.mode = Mode::Normal;
                Some(Command::ToggleHelp)
            }
            _ => None,
        }
    }

    fn parse_command(&self) -> Option<Command> {
        let input = self.command_buffer.trim();

        if input == "q" || input == "quit" {
            return Some(Command::Quit);
        }
        if input == "help" {
            return Some(Command::ToggleHelp);
        }

        // Handle load command with potential quoted path
        if let Some(rest) = input.strip_prefix("load ") {
            let path = rest.trim();
            let path = if (path.starts_with('\'') && path.ends_with('\'') && path.len() >= 2)
                || (path.starts_with('"') && path.ends_with('"') && path.len() >= 2)
            {
                // Remove surrounding quotes
                &path[1..path.len() - 1]
            } else {
                path
            };

            if !path.is_empty() {
                return Some(Command::LoadTrack(path.into()));
            }
        }

        None
    }
}
