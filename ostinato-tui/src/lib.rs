//! Terminal UI for Ostinato - widgets, theme, and layout

mod app;
mod theme;
pub mod widgets;

pub use app::{App, AppState, MessageType};
pub use theme::{Theme, CRT_AMBER, CRT_GREEN};
pub use widgets::{ControlsWidget, HelpWidget, ScopeWidget, StatusBarWidget, TransportWidget};
