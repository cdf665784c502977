use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::quiz::FinishReason;
use crate::session::result::QuizResult;
use crate::ui::theme::Theme;

pub struct QuizSummary<'a> {
    pub result: &'a QuizResult,
    pub theme: &'a Theme,
}

impl<'a> QuizSummary<'a> {
    pub fn new(result: &'a QuizResult, theme: &'a Theme) -> Self {
        Self { result, theme }
    }
}

impl Widget for QuizSummary<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let result = self.result;

        let block = Block::bordered()
            .title(" Quiz Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let heading = match result.finish_reason {
            Some(FinishReason::NoQuestions) if result.answered == 0 => {
                "No shortcuts can be asked with these settings"
            }
            Some(FinishReason::NoQuestions) => "Ran out of questions",
            _ => "Results",
        };
        Paragraph::new(Line::from(Span::styled(
            heading,
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let label = Style::default().fg(colors.fg());
        let value = Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD);
        let stats = vec![
            Line::from(vec![
                Span::styled("  Score:     ", label),
                Span::styled(format!("{}/{}", result.score, result.answered), value),
            ]),
            Line::from(vec![
                Span::styled("  Accuracy:  ", label),
                Span::styled(format!("{:.1}%", result.accuracy), value),
            ]),
            Line::from(vec![
                Span::styled("  Avg time:  ", label),
                Span::styled(format!("{:.1}s", result.avg_answer_ms / 1000.0), value),
            ]),
            Line::from(vec![
                Span::styled("  Timed out: ", label),
                Span::styled(result.timed_out.to_string(), value),
            ]),
        ];
        Paragraph::new(stats).render(layout[1], buf);

        let answers: Vec<Line> = result
            .answers
            .iter()
            .take(layout[2].height as usize)
            .map(|a| {
                let (mark, color) = if a.is_correct {
                    ("✓", colors.success())
                } else {
                    ("✗", colors.error())
                };
                Line::from(vec![
                    Span::styled(format!("  {mark} "), Style::default().fg(color)),
                    Span::styled(format!("{:<14}", a.correct_combo), Style::default().fg(colors.accent())),
                    Span::styled(a.description.clone(), label),
                ])
            })
            .collect();
        Paragraph::new(answers).render(layout[2], buf);

        Paragraph::new(Line::from(Span::styled(
            "  [F2] Play again  [F1] Visualizer  [Ctrl+Q] Quit",
            Style::default().fg(colors.text_pending()),
        )))
        .render(layout[3], buf);
    }
}
