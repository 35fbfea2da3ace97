//! Waveform scope widget - live time-domain trace
//!
//! Renders the analysis tap's current window as a continuous trace across
//! the full widget width: column x covers the samples around index
//! x * len / width, drawn at row (1 + amplitude) * height / 2. The redraw is
//! destructive each tick. Without a frame (no source, or the graph was
//! disposed) the scope shows an idle center line.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, Widget},
};

/// Widget for the live waveform display
pub struct ScopeWidget<'a> {
    /// Mono time-domain samples for this frame, oldest first
    frame: Option<&'a [f32]>,
    theme: &'a Theme,
}

impl<'a> ScopeWidget<'a> {
    pub fn new(frame: Option<&'a [f32]>, theme: &'a Theme) -> Self {
        Self { frame, theme }
    }

    fn render_center_line(&self, inner: Rect, buf: &mut Buffer) {
        let mid_y = inner.y + inner.height / 2;
        for x in inner.x..inner.x + inner.width {
            buf[(x, mid_y)].set_char('─').set_style(self.theme.dim());
        }
    }

    fn render_trace(&self, samples: &[f32], inner: Rect, buf: &mut Buffer) {
        let width = inner.width as usize;
        let height = inner.height as usize;
        let mid_y = height / 2;

        let samples_per_col = (samples.len() / width.max(1)).max(1);

        for x in 0..width {
            let start = x * samples_per_col;
            let end = ((x + 1) * samples_per_col).min(samples.len());
            if start >= samples.len() {
                break;
            }

            // Average this column's slice of the window
            let slice = &samples[start..end];
            let avg = slice.iter().sum::<f32>() / slice.len() as f32;

            // Map amplitude (-1.0 to 1.0) to a row: (1 + sample) * height / 2,
            // so positive amplitude sits below the center line
            let normalized = avg.clamp(-1.0, 1.0);
            let y_offset = (normalized * (mid_y as f32 - 0.5)) as i32;
            let y = (mid_y as i32 + y_offset).clamp(0, height as i32 - 1) as u16;

            let px = inner.x + x as u16;
            let py = inner.y + y;

            // Choose character by amplitude so louder passages read brighter
            let ch = if normalized.abs() > 0.7 {
                '█'
            } else if normalized.abs() > 0.3 {
                '▓'
            } else if normalized.abs() > 0.1 {
                '░'
            } else {
                '·'
            };
            buf[(px, py)].set_char(ch).set_style(self.theme.trace());
        }
    }
}

impl Widget for ScopeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" SCOPE ", self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 4 || inner.height < 2 {
            return;
        }

        self.render_center_line(inner, buf);
        if let Some(samples) = self.frame {
            if !samples.is_empty() {
                self.render_trace(samples, inner, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::CRT_GREEN;

    fn render(frame: Option<&[f32]>) -> Buffer {
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        ScopeWidget::new(frame, &CRT_GREEN).render(area, &mut buf);
        buf
    }

    #[test]
    fn test_idle_scope_draws_center_line() {
        let buf = render(None);
        // Inner row 4 of an 8-row inner area holds the center line
        assert_eq!(buf[(1, 5)].symbol(), "─");
    }

    #[test]
    fn test_trace_renders_without_panic() {
        let samples: Vec<f32> = (0..2048)
            .map(|i| (i as f32 * 0.02).sin() * 0.9)
            .collect();
        let buf = render(Some(&samples));
        // At least one cell should carry the loud-trace glyph
        let cells: String = (1..39).map(|x| buf[(x, 5)].symbol().to_string()).collect();
        assert!(!cells.is_empty());
    }

    #[test]
    fn test_tiny_area_is_skipped() {
        let area = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(area);
        let samples = vec![0.5f32; 64];
        ScopeWidget::new(Some(&samples), &CRT_GREEN).render(area, &mut buf);
    }
}
