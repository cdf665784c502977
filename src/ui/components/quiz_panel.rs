use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::keyboard::platform::Os;
use crate::keyboard::token::CanonicalToken;
use crate::session::quiz::{QuizState, QuizStatus};
use crate::ui::components::key_caps::KeyCaps;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

/// Current question, answer clock and feedback on the previous answer.
pub struct QuizPanel<'a> {
    pub state: &'a QuizState,
    /// Keys typed so far for the current answer.
    pub typed: &'a [CanonicalToken],
    pub os: Os,
    pub theme: &'a Theme,
}

impl<'a> QuizPanel<'a> {
    pub fn new(state: &'a QuizState, typed: &'a [CanonicalToken], os: Os, theme: &'a Theme) -> Self {
        Self {
            state,
            typed,
            os,
            theme,
        }
    }
}

impl Widget for QuizPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let state = self.state;

        let question_no = state.answered() + 1;
        let title = if state.settings.total_questions > 0 {
            format!(" Question {question_no}/{} ", state.settings.total_questions)
        } else {
            format!(" Question {question_no} ")
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        let prompt = match (&state.status, &state.current) {
            (QuizStatus::Paused, _) => Line::from(Span::styled(
                "Paused. Press Esc to resume.",
                Style::default().fg(colors.warning()).add_modifier(Modifier::BOLD),
            )),
            (_, Some(question)) => {
                let mut spans = vec![Span::styled(
                    question.prompt().to_string(),
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                )];
                if question.record.is_sequential() {
                    spans.push(Span::styled(
                        "  (one key after another)",
                        Style::default().fg(colors.text_pending()),
                    ));
                }
                Line::from(spans)
            }
            _ => Line::from(Span::styled(
                "Waiting for a question",
                Style::default().fg(colors.text_pending()),
            )),
        };
        Paragraph::new(prompt)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(layout[0], buf);

        let limit = state.settings.time_limit.as_secs_f64();
        let remaining = state.time_remaining.as_secs_f64();
        let ratio = if limit > 0.0 { remaining / limit } else { 0.0 };
        ProgressBar::new("Time", ratio, self.theme)
            .caption(format!("{remaining:.1}s"))
            .warn_below(0.3)
            .render(layout[1], buf);

        KeyCaps::new(self.typed, self.os, self.theme)
            .title(" Your answer ")
            .placeholder("Press the shortcut")
            .render(layout[2], buf);

        let mut lines = vec![Line::from(vec![
            Span::styled(" Score: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{}/{}", state.score, state.answered()),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            ),
        ])];
        if let Some(last) = state.history.last() {
            let (verdict, color) = if last.is_correct {
                ("Correct", colors.success())
            } else {
                ("Wrong", colors.error())
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {verdict}: "), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(last.question.prompt().to_string(), Style::default().fg(colors.fg())),
                Span::styled(
                    format!("  {}", last.correct_combo.display(self.os)),
                    Style::default().fg(colors.accent()),
                ),
            ]));
            if !last.is_correct {
                lines.push(Line::from(Span::styled(
                    format!(" You pressed: {}", last.answer),
                    Style::default().fg(colors.text_pending()),
                )));
            }
        }
        Paragraph::new(lines).render(layout[3], buf);
    }
}
