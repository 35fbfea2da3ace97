//! Transport widget - playback state, track name, and position

use crate::theme::Theme;
use ostinato_audio::PlaybackState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Widget for the transport panel
pub struct TransportWidget<'a> {
    playback: PlaybackState,
    track_name: Option<&'a str>,
    position_secs: f64,
    duration_secs: f64,
    theme: &'a Theme,
}

impl<'a> TransportWidget<'a> {
    pub fn new(playback: PlaybackState, theme: &'a Theme) -> Self {
        Self {
            playback,
            track_name: None,
            position_secs: 0.0,
            duration_secs: 0.0,
            theme,
        }
    }

    pub fn track_name(mut self, name: Option<&'a str>) -> Self {
        self.track_name = name;
        self
    }

    pub fn position(mut self, position_secs: f64, duration_secs: f64) -> Self {
        self.position_secs = position_secs;
        self.duration_secs = duration_secs;
        self
    }

    fn state_indicator(&self) -> (&'static str, ratatui::style::Style) {
        match self.playback {
            PlaybackState::Idle => ("∅ IDLE", self.theme.dim()),
            PlaybackState::Loading => ("◌ LOADING", self.theme.dim()),
            PlaybackState::Ready => ("■ READY", self.theme.normal()),
            PlaybackState::Playing => ("▶ LOOP", self.theme.highlight()),
            PlaybackState::Paused => ("▮▮ PAUSED", self.theme.normal()),
        }
    }

    fn format_time(secs: f64) -> String {
        let total = secs.max(0.0) as u64;
        format!("{}:{:02}", total / 60, total % 60)
    }
}

impl Widget for TransportWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" TRANSPORT ", self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 10 {
            return;
        }

        let (state_text, state_style) = self.state_indicator();
        let track = self.track_name.unwrap_or("No track loaded");
        let name_width = (inner.width as usize).saturating_sub(state_text.len() + 16);
        let truncated: String = track.chars().take(name_width).collect();

        let time_str = format!(
            " {}/{}",
            Self::format_time(self.position_secs),
            Self::format_time(self.duration_secs)
        );

        let line = Line::from(vec![
            Span::styled(state_text, state_style),
            Span::raw("  "),
            Span::styled(truncated, self.theme.normal()),
            Span::styled(time_str, self.theme.dim()),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::CRT_GREEN;

    #[test]
    fn test_renders_all_states() {
        for state in [
            PlaybackState::Idle,
            PlaybackState::Loading,
            PlaybackState::Ready,
            PlaybackState::Playing,
            PlaybackState::Paused,
        ] {
            let area = Rect::new(0, 0, 50, 3);
            let mut buf = Buffer::empty(area);
            TransportWidget::new(state, &CRT_GREEN)
                .track_name(Some("loop.wav"))
                .position(12.0, 180.0)
                .render(area, &mut buf);
        }
    }

    #[test]
    fn test_time_formatting() {
        assert_eq!(TransportWidget::format_time(0.0), "0:00");
        assert_eq!(TransportWidget::format_time(61.4), "1:01");
        assert_eq!(TransportWidget::format_time(-3.0), "0:00");
    }
}
