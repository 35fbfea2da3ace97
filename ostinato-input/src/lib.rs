//! Vim-style modal keyboard input handling for Ostinato

mod commands;
mod modal;

pub use commands::Command;
pub use modal::{InputHandler, Mode};
