// Library target shared by the binary, integration tests and criterion benchmarks.
// The binary entry point is main.rs and imports everything via `shortcutdr::*`.

pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod generator;
pub mod keyboard;
pub mod session;
pub mod ui;
