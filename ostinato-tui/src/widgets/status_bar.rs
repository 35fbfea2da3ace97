//! Status bar widget - mode indicator and command line

use crate::app::MessageType;
use crate::theme::Theme;
use ostinato_input::Mode;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Widget for displaying the status bar with mode and command input
pub struct StatusBarWidget<'a> {
    mode: Mode,
    command_buffer: &'a str,
    message: Option<&'a str>,
    message_type: MessageType,
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(mode: Mode, command_buffer: &'a str, theme: &'a Theme) -> Self {
        Self {
            mode,
            command_buffer,
            message: None,
            message_type: MessageType::Info,
            theme,
        }
    }

    pub fn message(mut self, msg: Option<&'a str>, msg_type: MessageType) -> Self {
        self.message = msg;
        self.message_type = msg_type;
        self
    }

    fn mode_string(&self) -> (&'static str, Style) {
        match self.mode {
            Mode::Normal => ("NORMAL", self.theme.highlight()),
            Mode::Command => ("COMMAND", Style::from(self.theme.accent)),
            Mode::Help => ("HELP", self.theme.highlight()),
        }
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Length(10), // Mode indicator
            Constraint::Min(20),    // Command/message area
            Constraint::Length(20), // Help hint
        ])
        .split(area);

        // Mode indicator
        let (mode_text, mode_style) = self.mode_string();
        let mode_line = Line::from(vec![
            Span::raw("["),
            Span::styled(mode_text, mode_style),
            Span::raw("]"),
        ]);
        Paragraph::new(mode_line).render(chunks[0], buf);

        // Command/message area
        let content = if self.mode == Mode::Command {
            Line::from(vec![
                Span::styled(":", Style::from(self.theme.accent)),
                Span::styled(self.command_buffer, self.theme.normal()),
                Span::styled("█", self.theme.highlight()), // Cursor
            ])
        } else if let Some(msg) = self.message {
            let msg_style = match self.message_type {
                MessageType::Info => self.theme.dim(),
                MessageType::Success => Style::from(self.theme.accent),
                MessageType::Warning => Style::default().fg(self.theme.warning),
                MessageType::Error => Style::default().fg(self.theme.danger),
            };
            Line::from(Span::styled(msg, msg_style))
        } else {
            Line::from(Span::styled("", self.theme.dim()))
        };
        Paragraph::new(content).render(chunks[1], buf);

        // Help hint
        let hint = Line::from(Span::styled("? for help", self.theme.dim()));
        Paragraph::new(hint).render(chunks[2], buf);
    }
}

/// Key binding reference shown as an overlay
pub struct HelpWidget<'a> {
    theme: &'a Theme,
}

impl<'a> HelpWidget<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

const HELP_LINES: &[(&str, &str)] = &[
    ("space", "play / pause the loop"),
    ("[ ]", "tempo -1% / +1%"),
    ("{ }", "tempo -10% / +10%"),
    ("- =", "pitch -1% / +1%"),
    ("_ +", "pitch -10% / +10%"),
    ("0", "reset tempo and pitch to 100%"),
    (":load <path>", "load an audio file"),
    (":q", "quit"),
    ("ctrl-q", "quit"),
];

impl Widget for HelpWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" KEYS ", self.theme.title()))
            .style(self.theme.normal());

        let inner = block.inner(area);
        block.render(area, buf);

        for (i, (key, desc)) in HELP_LINES.iter().enumerate() {
            if i as u16 >= inner.height {
                break;
            }
            let line = Line::from(vec![
                Span::styled(format!(" {key:<14}"), self.theme.highlight()),
                Span::styled(format!(" {desc}"), self.theme.normal()),
            ]);
            Paragraph::new(line).render(
                Rect::new(inner.x, inner.y + i as u16, inner.width, 1),
                buf,
            );
        }
    }
}
