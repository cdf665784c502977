use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::protection::ProtectionLevel;
use crate::keyboard::combo::NormalizedCombo;
use crate::keyboard::platform::Os;
use crate::ui::theme::Theme;

pub struct ShortcutRow<'a> {
    pub combo: &'a NormalizedCombo,
    pub description: &'a str,
    /// `None` renders the row without protection colouring.
    pub protection: Option<ProtectionLevel>,
}

/// Two-column list of combos and descriptions.
pub struct ShortcutList<'a> {
    pub title: &'a str,
    pub rows: Vec<ShortcutRow<'a>>,
    pub os: Os,
    pub keyboard_locked: bool,
    pub empty_text: &'a str,
    pub theme: &'a Theme,
}

impl<'a> ShortcutList<'a> {
    pub fn new(title: &'a str, rows: Vec<ShortcutRow<'a>>, os: Os, theme: &'a Theme) -> Self {
        Self {
            title,
            rows,
            os,
            keyboard_locked: false,
            empty_text: "",
            theme,
        }
    }

    pub fn keyboard_locked(mut self, locked: bool) -> Self {
        self.keyboard_locked = locked;
        self
    }

    pub fn empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }
}

impl Widget for ShortcutList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let title = if self.rows.is_empty() {
            format!(" {} ", self.title)
        } else {
            format!(" {} ({}) ", self.title, self.rows.len())
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.rows.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", self.empty_text),
                Style::default().fg(colors.text_pending()),
            )))
            .render(inner, buf);
            return;
        }

        let combos: Vec<String> = self.rows.iter().map(|r| r.combo.display(self.os)).collect();
        let combo_width = combos
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0)
            .min(inner.width as usize / 2);

        let lines: Vec<Line> = self
            .rows
            .iter()
            .zip(&combos)
            .take(inner.height as usize)
            .map(|(row, combo)| {
                let combo_style = match row.protection {
                    Some(level) => Style::default()
                        .fg(colors.protection(level, self.keyboard_locked))
                        .add_modifier(Modifier::BOLD),
                    None => Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
                };
                Line::from(vec![
                    Span::styled(format!(" {combo:<combo_width$}  "), combo_style),
                    Span::styled(row.description.to_string(), Style::default().fg(colors.fg())),
                ])
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
