// Terminal UI implementation using ratatui
// The terminal face of the directory

pub mod app;
pub mod runner;
pub mod ui;

pub use app::{App, FaviconStatus, InputMode};
pub use runner::run_tui;
