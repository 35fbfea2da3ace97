//! UI widgets for Ostinato

mod controls;
mod scope;
pub mod status_bar;
mod transport;

pub use controls::ControlsWidget;
pub use scope::ScopeWidget;
pub use status_bar::{HelpWidget, StatusBarWidget};
pub use transport::TransportWidget;
