//! CRT-style themes for Ostinato

use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    /// Primary foreground color (text, borders)
    pub fg: Color,
    /// Dimmed foreground (secondary text)
    pub fg_dim: Color,
    /// Background color
    pub bg: Color,
    /// Highlight color (selected items, active elements)
    pub highlight: Color,
    /// Accent color (waveform trace, meters)
    pub accent: Color,
    /// Warning color
    pub warning: Color,
    /// Error/danger color
    pub danger: Color,
}

impl Theme {
    /// Get style for normal text
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get style for dimmed text
    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    /// Get style for highlighted/selected items
    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for borders
    pub fn border(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    /// Get style for the waveform trace
    pub fn trace(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Get title style
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for meters/bars based on level (0.0 - 1.0)
    pub fn meter_style(&self, level: f32) -> Style {
        let color = if level > 0.9 {
            self.danger
        } else if level > 0.75 {
            self.warning
        } else {
            self.accent
        };
        Style::default().fg(color)
    }
}

/// Classic phosphor green CRT theme
pub const CRT_GREEN: Theme = Theme {
    name: "phosphor-green",
    fg: Color::Rgb(51, 255, 51),
    fg_dim: Color::Rgb(25, 128, 25),
    bg: Color::Rgb(0, 10, 0),
    highlight: Color::Rgb(180, 255, 180),
    accent: Color::Rgb(120, 255, 120),
    warning: Color::Rgb(255, 200, 60),
    danger: Color::Rgb(255, 80, 60),
};

/// Amber phosphor CRT theme
pub const CRT_AMBER: Theme = Theme {
    name: "phosphor-amber",
    fg: Color::Rgb(255, 176, 0),
    fg_dim: Color::Rgb(128, 88, 0),
    bg: Color::Rgb(10, 5, 0),
    highlight: Color::Rgb(255, 220, 150),
    accent: Color::Rgb(255, 200, 90),
    warning: Color::Rgb(255, 255, 120),
    danger: Color::Rgb(255, 80, 60),
};
