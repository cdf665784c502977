use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::keyboard::platform::Os;
use crate::keyboard::token::{CanonicalToken, display_token};
use crate::ui::theme::Theme;

/// Held keys drawn as key caps: ` Ctrl  +  Shift  +  T `.
pub struct KeyCaps<'a> {
    pub tokens: &'a [CanonicalToken],
    pub os: Os,
    pub title: &'a str,
    pub placeholder: &'a str,
    pub theme: &'a Theme,
}

impl<'a> KeyCaps<'a> {
    pub fn new(tokens: &'a [CanonicalToken], os: Os, theme: &'a Theme) -> Self {
        Self {
            tokens,
            os,
            title: " Pressed ",
            placeholder: "Press any key combination",
            theme,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for KeyCaps<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(self.title)
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.tokens.is_empty() {
            Line::from(Span::styled(
                self.placeholder,
                Style::default().fg(colors.text_pending()),
            ))
        } else {
            let cap = Style::default()
                .fg(colors.key_cap_fg())
                .bg(colors.key_cap_bg())
                .add_modifier(Modifier::BOLD);
            let mut spans = Vec::with_capacity(self.tokens.len() * 2);
            for (i, token) in self.tokens.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(" + ", Style::default().fg(colors.text_pending())));
                }
                spans.push(Span::styled(
                    format!(" {} ", display_token(token.as_str(), self.os)),
                    cap,
                ));
            }
            Line::from(spans)
        };

        let top = inner.y + inner.height.saturating_sub(1) / 2;
        let row = Rect::new(inner.x, top, inner.width, 1.min(inner.height));
        Paragraph::new(line).alignment(Alignment::Center).render(row, buf);
    }
}
