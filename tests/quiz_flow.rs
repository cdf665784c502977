use std::collections::HashSet;
use std::time::{Duration, Instant};

use shortcutdr::engine::catalog::ShortcutCatalog;
use shortcutdr::engine::index::ShortcutIndex;
use shortcutdr::engine::protection::ProtectionLevel;
use shortcutdr::engine::shortcut::ShortcutRecord;
use shortcutdr::generator::answerable;
use shortcutdr::keyboard::combo::normalize;
use shortcutdr::keyboard::platform::Os;
use shortcutdr::keyboard::token::KeyContext;
use shortcutdr::session::quiz::{
    FinishReason, QuizAction, QuizMode, QuizSettings, QuizStatus, UserAnswer,
};
use shortcutdr::session::quiz_session::QuizSession;
use shortcutdr::session::result::QuizResult;

fn ctx(os: Os) -> KeyContext {
    KeyContext::new(os, Default::default())
}

fn bundled(os: Os) -> Vec<ShortcutIndex> {
    ShortcutCatalog::available()
        .iter()
        .map(|id| ShortcutCatalog::bundled(id).unwrap().index(id, os))
        .collect()
}

fn settings(os: Os, total: usize) -> QuizSettings {
    QuizSettings {
        apps: ShortcutCatalog::available(),
        os,
        total_questions: total,
        ..QuizSettings::default()
    }
}

#[test]
fn ten_question_quiz_runs_to_completion() {
    let t = Instant::now();
    let mut session = QuizSession::seeded(bundled(Os::Windows), ctx(Os::Windows), 7);
    session.start(settings(Os::Windows, 10), t);

    let mut asked = HashSet::new();
    for i in 0..10 {
        let question = session.state().current.clone().unwrap();
        assert!(asked.insert(question.combo().clone()), "combo asked twice");
        if i % 2 == 0 {
            session.dispatch(QuizAction::Answer(question.combo().clone()), t);
        } else {
            session.dispatch(QuizAction::Answer(normalize("Ctrl+Alt+Shift+F12")), t);
        }
    }

    let state = session.state();
    assert_eq!(state.status, QuizStatus::Finished);
    assert_eq!(state.finish_reason, Some(FinishReason::Completed));
    assert_eq!(state.history.len(), 10);
    assert_eq!(state.score, 5);

    let result = QuizResult::from_state(state);
    assert!((result.accuracy - 50.0).abs() < f64::EPSILON);
    assert_eq!(result.answers.len(), 10);
}

#[test]
fn pool_recycles_when_exhausted() {
    let index = ShortcutIndex::from_records(
        "tiny",
        Os::Linux,
        vec![
            ShortcutRecord::simple("tiny", "Ctrl+S", "Save"),
            ShortcutRecord::simple("tiny", "Ctrl+O", "Open"),
        ],
    );
    let t = Instant::now();
    let mut session = QuizSession::seeded(vec![index], ctx(Os::Linux), 3);
    session.start(settings(Os::Linux, 5), t);

    let mut combos = Vec::new();
    while session.state().status == QuizStatus::Playing {
        let combo = session.state().current.as_ref().unwrap().combo().clone();
        combos.push(combo.clone());
        session.dispatch(QuizAction::Answer(combo), t);
    }
    assert_eq!(combos.len(), 5);
    // Both combos are asked before either repeats.
    assert_ne!(combos[0], combos[1]);
    assert_eq!(session.state().score, 5);
}

#[test]
fn questions_are_always_answerable() {
    let t = Instant::now();
    for os in Os::all() {
        for mode in [QuizMode::Casual, QuizMode::Hardcore] {
            for fullscreen in [false, true] {
                for seed in 0..5 {
                    let mut session = QuizSession::seeded(bundled(*os), ctx(*os), seed);
                    session.start(
                        QuizSettings {
                            mode,
                            fullscreen,
                            ..settings(*os, 0)
                        },
                        t,
                    );
                    for _ in 0..20 {
                        let Some(question) = session.state().current.clone() else {
                            break;
                        };
                        assert!(answerable(question.protection, fullscreen, mode));
                        session.dispatch(QuizAction::Timeout, t);
                    }
                }
            }
        }
    }
}

#[test]
fn casual_mode_skips_browser_reserved_combos() {
    let t = Instant::now();
    for seed in 0..10 {
        let mut session = QuizSession::seeded(bundled(Os::Windows), ctx(Os::Windows), seed);
        session.start(settings(Os::Windows, 0), t);
        for _ in 0..30 {
            let question = session.state().current.clone().unwrap();
            assert_eq!(question.protection, ProtectionLevel::None);
            session.dispatch(QuizAction::Timeout, t);
        }
    }
}

#[test]
fn unanswered_questions_time_out() {
    let t = Instant::now();
    let mut session = QuizSession::seeded(bundled(Os::Macos), ctx(Os::Macos), 11);
    session.start(
        QuizSettings {
            time_limit: Duration::from_secs(5),
            ..settings(Os::Macos, 2)
        },
        t,
    );
    session.tick(t + Duration::from_secs(6));
    session.tick(t + Duration::from_secs(12));

    let state = session.state();
    assert_eq!(state.status, QuizStatus::Finished);
    assert!(state.history.iter().all(|a| a.answer == UserAnswer::TimedOut));
    assert_eq!(state.score, 0);
}

#[test]
fn pause_freezes_the_clock() {
    let t = Instant::now();
    let mut session = QuizSession::seeded(bundled(Os::Linux), ctx(Os::Linux), 5);
    session.start(settings(Os::Linux, 3), t);
    session.pause(t + Duration::from_secs(1));
    session.tick(t + Duration::from_secs(120));
    assert!(session.state().history.is_empty());
    assert_eq!(session.state().status, QuizStatus::Paused);

    // Answers are ignored while paused.
    let combo = session.state().current.as_ref().unwrap().combo().clone();
    session.dispatch(QuizAction::Answer(combo), t);
    assert!(session.state().history.is_empty());
}
