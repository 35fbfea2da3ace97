//! Controls widget - tempo and pitch percentage readouts

use crate::theme::Theme;
use ostinato_audio::{params, ControlPercent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Widget showing both percentage controls and their mapped graph values
pub struct ControlsWidget<'a> {
    tempo: ControlPercent,
    pitch: ControlPercent,
    theme: &'a Theme,
}

impl<'a> ControlsWidget<'a> {
    pub fn new(tempo: ControlPercent, pitch: ControlPercent, theme: &'a Theme) -> Self {
        Self {
            tempo,
            pitch,
            theme,
        }
    }

    /// Bar cells filled for a percent within [50, 200]
    fn bar(percent: ControlPercent, width: usize) -> String {
        let span = (params::PERCENT_MAX - params::PERCENT_MIN) as f32;
        let filled = ((percent.get() - params::PERCENT_MIN) as f32 / span * width as f32)
            .round() as usize;
        let filled = filled.min(width);
        let mut bar = String::with_capacity(width);
        for i in 0..width {
            bar.push(if i < filled { '█' } else { '·' });
        }
        bar
    }

    fn control_line(
        &self,
        label: &'static str,
        percent: ControlPercent,
        mapped: String,
        bar_width: usize,
    ) -> Line<'a> {
        let level = (percent.get() - params::PERCENT_MIN) as f32
            / (params::PERCENT_MAX - params::PERCENT_MIN) as f32;
        Line::from(vec![
            Span::styled(label, self.theme.dim()),
            Span::styled(Self::bar(percent, bar_width), self.theme.meter_style(level)),
            Span::styled(format!(" {:3}% ", percent.get()), self.theme.normal()),
            Span::styled(mapped, self.theme.dim()),
        ])
    }
}

impl Widget for ControlsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" CONTROLS ", self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 2 || inner.width < 24 {
            return;
        }

        let bar_width = (inner.width as usize).saturating_sub(24);

        let tempo_line = self.control_line(
            "TEMPO ",
            self.tempo,
            format!("×{:.2}", params::tempo_rate(self.tempo)),
            bar_width,
        );
        let pitch_line = self.control_line(
            "PITCH ",
            self.pitch,
            format!("{:+.2} st", params::pitch_semitones(self.pitch)),
            bar_width,
        );

        Paragraph::new(tempo_line).render(
            Rect::new(inner.x, inner.y, inner.width, 1),
            buf,
        );
        Paragraph::new(pitch_line).render(
            Rect::new(inner.x, inner.y + 1, inner.width, 1),
            buf,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::CRT_GREEN;

    #[test]
    fn test_bar_rails() {
        assert!(ControlsWidget::bar(ControlPercent::new(50), 10)
            .chars()
            .all(|c| c == '·'));
        assert!(ControlsWidget::bar(ControlPercent::new(200), 10)
            .chars()
            .all(|c| c == '█'));
    }

    #[test]
    fn test_renders_defaults() {
        let area = Rect::new(0, 0, 60, 4);
        let mut buf = Buffer::empty(area);
        ControlsWidget::new(
            ControlPercent::default(),
            ControlPercent::default(),
            &CRT_GREEN,
        )
        .render(area, &mut buf);
    }
}
