use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Bordered horizontal bar with a centered caption.
pub struct ProgressBar<'a> {
    pub label: String,
    pub ratio: f64,
    pub caption: String,
    /// Bar colour switches to the warning colour below this ratio.
    pub warn_below: Option<f64>,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(label: &str, ratio: f64, theme: &'a Theme) -> Self {
        let ratio = ratio.clamp(0.0, 1.0);
        Self {
            label: label.to_string(),
            ratio,
            caption: format!("{:.0}%", ratio * 100.0),
            warn_below: None,
            theme,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn warn_below(mut self, threshold: f64) -> Self {
        self.warn_below = Some(threshold);
        self
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64) as u16;
        let fill = match self.warn_below {
            Some(threshold) if self.ratio < threshold => colors.warning(),
            _ => colors.bar_filled(),
        };

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(fill)
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(self.caption.chars().count() as u16)) / 2;
        buf.set_string(label_x, inner.y, &self.caption, Style::default().fg(colors.fg()));
    }
}
