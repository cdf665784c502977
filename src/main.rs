use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableFocusChange, EnableFocusChange, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use log::{info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use shortcutdr::app::{App, AppScreen};
use shortcutdr::config::Config;
use shortcutdr::engine::catalog::ShortcutCatalog;
use shortcutdr::engine::protection::ProtectionLevel;
use shortcutdr::event::{AppEvent, EventHandler};
use shortcutdr::session::quiz::QuizStatus;
use shortcutdr::ui::components::key_caps::KeyCaps;
use shortcutdr::ui::components::quiz_panel::QuizPanel;
use shortcutdr::ui::components::quiz_summary::QuizSummary;
use shortcutdr::ui::components::shortcut_list::{ShortcutList, ShortcutRow};
use shortcutdr::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use shortcutdr::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "shortcutdr",
    version,
    about = "Terminal keyboard shortcut visualizer and recall quiz"
)]
struct Cli {
    #[arg(long, help = "Target OS (windows, macos, linux, auto)")]
    os: Option<String>,

    #[arg(short, long, help = "Keyboard layout (qwerty, dvorak, colemak)")]
    layout: Option<String>,

    #[arg(short, long = "app", help = "Shortcut catalog to use, repeatable")]
    apps: Vec<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Quiz difficulty (basic, standard, hard, madmax, all)")]
    difficulty: Option<String>,

    #[arg(short, long, help = "Quiz mode (casual, hardcore)")]
    mode: Option<String>,

    #[arg(short, long, help = "Questions per quiz, 0 for endless")]
    questions: Option<usize>,

    #[arg(long, help = "Start with keyboard lock (simulated fullscreen) enabled")]
    fullscreen: bool,

    #[arg(long, help = "List available shortcut catalogs and exit")]
    list_apps: bool,

    #[arg(long, help = "List bundled themes and exit")]
    list_themes: bool,

    #[arg(long, value_name = "PATH", help = "Write a JSON summary of each finished quiz")]
    summary: Option<PathBuf>,

    #[arg(long, help = "Save the resulting options to the config file")]
    save_config: bool,
}

fn init_logging() {
    let Some(dir) = dirs::data_dir().map(|d| d.join("shortcutdr")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join("shortcutdr.log")) else {
        return;
    };
    // The terminal belongs to the UI; logs go to a file.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let catalogs = ShortcutCatalog::discover(Some(&ShortcutCatalog::user_dir()));
    if cli.list_apps {
        for id in &catalogs {
            println!("{id}");
        }
        return Ok(());
    }
    if cli.list_themes {
        for name in Theme::available_themes() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        warn!("falling back to default config: {err:#}");
        Config::default()
    });
    if let Some(os) = cli.os {
        config.os = os;
    }
    if let Some(layout) = cli.layout {
        config.keyboard_layout = layout;
    }
    if !cli.apps.is_empty() {
        config.apps = cli.apps;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(mode) = cli.mode {
        config.quiz_mode = mode;
    }
    if let Some(questions) = cli.questions {
        config.total_questions = questions;
    }
    if cli.fullscreen {
        config.assume_fullscreen = true;
    }
    config.normalize(&catalogs);
    if cli.save_config {
        config.save()?;
    }

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        warn!("unknown theme {:?}, using default", config.theme);
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));
    let tick_rate = config.tick_rate();

    let mut app = App::new(config, theme);
    app.summary_path = cli.summary;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;

    // Release events and bare modifier presses need the kitty protocol.
    let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false)
        && execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        )
        .is_ok();
    app.keyboard_enhanced = keyboard_enhanced;
    info!(
        "os={} layout={} enhanced={keyboard_enhanced}",
        app.ctx.os.as_str(),
        app.ctx.layout.name
    );

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(tick_rate);

    let result = run_app(&mut terminal, &mut app, &events);

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => app.handle_key(key, Instant::now()),
            AppEvent::FocusLost => app.blur(),
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::FocusGained | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    match app.screen {
        AppScreen::Visualizer => render_visualizer(frame, app),
        AppScreen::Quiz => render_quiz(frame, app),
        AppScreen::QuizResult => render_result(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, info: &str) {
    let colors = &app.theme.colors;
    let lock = if app.fullscreen { "on" } else { "off" };
    let header_info = format!(" {info} | {} | Keyboard lock: {lock}", app.ctx.os.as_str());
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " shortcutdr ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|line| {
            Line::from(Span::styled(
                line,
                Style::default().fg(app.theme.colors.text_pending()),
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_visualizer(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(frame.area());
    let view = app.visualizer.view();
    let os = app.ctx.os;

    render_header(frame, app, app_layout.header, &app.catalog_name);

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(app_layout.main);

    let pressed = KeyCaps::new(&view.pressed, os, app.theme);
    frame.render_widget(pressed, main_layout[0]);

    let status = match &view.matched {
        Some(record) => {
            let level = app.visualizer.protection(record);
            let mut spans = vec![Span::styled(
                record.description.clone(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )];
            if level != ProtectionLevel::None {
                spans.push(Span::styled(
                    format!("  ({})", level.as_str()),
                    Style::default().fg(colors.protection(level, app.fullscreen)),
                ));
            }
            Line::from(spans)
        }
        None if !view.sequence.is_empty() => {
            let steps: Vec<&str> = view.sequence.iter().map(|t| t.as_str()).collect();
            Line::from(Span::styled(
                format!("Sequence: {}, then ...", steps.join(", then ")),
                Style::default().fg(colors.accent_dim()),
            ))
        }
        None if !view.combo.is_empty() => Line::from(Span::styled(
            "No shortcut",
            Style::default().fg(colors.text_pending()),
        )),
        None => Line::default(),
    };
    let status_block = Block::bordered()
        .title(" Shortcut ")
        .border_style(Style::default().fg(colors.border()));
    frame.render_widget(Paragraph::new(status).block(status_block), main_layout[1]);

    let available: Vec<ShortcutRow> = view
        .available
        .iter()
        .map(|record| ShortcutRow {
            combo: &record.combo,
            description: &record.description,
            protection: Some(app.visualizer.protection(record)),
        })
        .collect();
    let title = if view.combo.is_empty() { "Shortcuts" } else { "Available" };
    let list = ShortcutList::new(title, available, os, app.theme)
        .keyboard_locked(app.fullscreen)
        .empty_text("Hold a modifier to list its shortcuts");
    frame.render_widget(list, main_layout[2]);

    if let Some(sidebar) = app_layout.sidebar {
        let rows: Vec<ShortcutRow> = app
            .visualizer
            .history()
            .iter()
            .map(|entry| ShortcutRow {
                combo: &entry.combo,
                description: &entry.description,
                protection: None,
            })
            .collect();
        let history = ShortcutList::new("History", rows, os, app.theme)
            .empty_text("Matched shortcuts show up here");
        frame.render_widget(history, sidebar);
    }

    render_footer(
        frame,
        app,
        app_layout.footer,
        &[
            "[F2] Quiz",
            "[F3] Next app",
            "[F11] Keyboard lock",
            "[Ctrl+Q] Quit",
        ],
    );
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let app_layout = AppLayout::new(frame.area());
    let state = app.quiz.state();
    let os = app.ctx.os;

    let info = format!(
        "Quiz ({}) | {} | Score {}",
        state.settings.mode.as_str(),
        state.settings.apps.join(", "),
        state.score
    );
    render_header(frame, app, app_layout.header, &info);

    let typed = app.quiz_typed();
    let panel = QuizPanel::new(state, &typed, os, app.theme);
    frame.render_widget(panel, app_layout.main);

    if let Some(sidebar) = app_layout.sidebar {
        let rows: Vec<ShortcutRow> = state
            .history
            .iter()
            .rev()
            .map(|answered| ShortcutRow {
                combo: &answered.correct_combo,
                description: answered.question.prompt(),
                protection: None,
            })
            .collect();
        let list = ShortcutList::new("Answered", rows, os, app.theme);
        frame.render_widget(list, sidebar);
    }

    let pause_hint = if state.status == QuizStatus::Paused {
        "[Esc] Resume"
    } else {
        "[Esc] Pause"
    };
    render_footer(
        frame,
        app,
        app_layout.footer,
        &[
            pause_hint,
            "[F1] Visualizer",
            "[F2] Restart",
            "[F11] Keyboard lock",
            "[Ctrl+Q] Quit",
        ],
    );
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    if let Some(ref result) = app.last_result {
        let centered = centered_rect(60, 70, frame.area());
        frame.render_widget(QuizSummary::new(result, app.theme), centered);
    }
}
