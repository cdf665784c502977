use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥90 cols: main panel + history sidebar
    Narrow, // <90 cols: main panel only
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 90 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn show_sidebar(&self) -> bool {
        *self == LayoutTier::Wide
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub sidebar: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(area);

        if tier.show_sidebar() {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
                .split(vertical[1]);

            Self {
                header: vertical[0],
                main: horizontal[0],
                sidebar: Some(horizontal[1]),
                footer: vertical[2],
                tier,
            }
        } else {
            Self {
                header: vertical[0],
                main: vertical[1],
                sidebar: None,
                footer: vertical[2],
                tier,
            }
        }
    }
}

/// Join key hints into as few lines of `width` as possible.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let mut out: Vec<String> = Vec::new();
    let mut current = String::from(" ");
    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if current.trim().is_empty() {
            format!("{current}{hint}")
        } else {
            format!("{current}  {hint}")
        };
        if candidate.chars().count() <= width || current.trim().is_empty() {
            current = candidate;
        } else {
            out.push(current);
            current = format!(" {hint}");
        }
    }
    if !current.trim().is_empty() {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 48;
    const MIN_POPUP_HEIGHT: u16 = 12;

    let target_w = (area.width.saturating_mul(percent_x.min(100)) / 100)
        .max(MIN_POPUP_WIDTH)
        .min(area.width);
    let target_h = (area.height.saturating_mul(percent_y.min(100)) / 100)
        .max(MIN_POPUP_HEIGHT)
        .min(area.height);

    Rect::new(
        area.x + (area.width - target_w) / 2,
        area.y + (area.height - target_h) / 2,
        target_w,
        target_h,
    )
}
