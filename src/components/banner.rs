use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Info,
    Success,
    Warning,
}

impl BannerLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            BannerLevel::Info => "󰋼",
            BannerLevel::Success => "󰄬",
            BannerLevel::Warning => "󰀦",
        }
    }

    fn color(&self) -> Color {
        match self {
            BannerLevel::Info => Color::Cyan,
            BannerLevel::Success => Color::Green,
            BannerLevel::Warning => Color::Yellow,
        }
    }
}

/// An inline notice box rendered above the form fields
#[derive(Debug, Clone)]
pub struct NoticeBanner {
    pub level: BannerLevel,
    pub title: String,
    pub message: Option<String>,
    pub dismiss_hint: Option<&'static str>,
}

impl NoticeBanner {
    pub fn new(level: BannerLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: None,
            dismiss_hint: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_dismiss_hint(mut self, hint: &'static str) -> Self {
        self.dismiss_hint = Some(hint);
        self
    }

    /// Rows this banner occupies, border included
    pub fn height(&self) -> u16 {
        // Title row + optional message row, inside a bordered block.
        if self.message.is_some() {
            4
        } else {
            3
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let fg = self.level.color();

        let mut title_spans = vec![Span::styled(
            format!("{} {}", self.level.icon(), self.title),
            Style::default().fg(fg).add_modifier(Modifier::BOLD),
        )];
        if let Some(hint) = self.dismiss_hint {
            title_spans.push(Span::styled(
                format!("  ({hint})"),
                Style::default().fg(Color::DarkGray),
            ));
        }

        let mut lines = vec![Line::from(title_spans)];
        if let Some(ref message) = self.message {
            lines.push(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Gray),
            )));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(fg));
        let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(para, area);
    }
}
