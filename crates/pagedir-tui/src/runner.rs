// TUI event loop and terminal management
use crate::{App, InputMode};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pagedir_core::{FaviconSource, IconLoader, RepositoryRecord, RepositorySource};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Results coming back from background tasks
enum Update {
    Loaded(pagedir_core::Result<Vec<RepositoryRecord>>),
    Favicon(String, FaviconSource),
}

const TICK: Duration = Duration::from_millis(100);

pub async fn run_tui(
    mut app: App,
    source: Arc<dyn RepositorySource>,
    icon_loader: Option<Arc<dyn IconLoader>>,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Update>();

    // The one fetch for this session
    app.controller.begin_load();
    {
        let tx = tx.clone();
        let owner = app.controller.owner().to_string();
        tokio::spawn(async move {
            let result = source.list_repositories(&owner).await;
            let _ = tx.send(Update::Loaded(result));
        });
    }

    let mut terminal = setup_terminal()?;

    let result = event_loop(&mut terminal, &mut app, &tx, &mut rx, icon_loader.as_ref()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Raw mode plus alternate screen; raw mode is undone if the rest fails
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    undo_on_error(
        || -> io::Result<_> {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            Terminal::new(CrosstermBackend::new(stdout))
        },
        || {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
        },
    )
}

/// Run `step`; if it fails, run `undo` before handing the error back
fn undo_on_error<T>(step: impl FnOnce() -> io::Result<T>, undo: impl FnOnce()) -> io::Result<T> {
    let result = step();
    if result.is_err() {
        undo();
    }
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tx: &mpsc::UnboundedSender<Update>,
    rx: &mut mpsc::UnboundedReceiver<Update>,
    icon_loader: Option<&Arc<dyn IconLoader>>,
) -> anyhow::Result<()> {
    loop {
        while let Ok(update) = rx.try_recv() {
            match update {
                Update::Loaded(result) => {
                    app.controller.finish_load(result);
                    app.refresh();
                    if let Some(loader) = icon_loader {
                        schedule_favicons(app, loader, tx);
                    }
                }
                Update::Favicon(url, source) => {
                    app.set_favicon(url, source);
                }
            }
        }

        terminal.draw(|f| crate::ui::render(f, app))?;

        if !event::poll(TICK)? {
            tokio::task::yield_now().await;
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match app.input_mode {
                InputMode::Searching => match key.code {
                    KeyCode::Enter | KeyCode::Esc => {
                        app.enter_normal_mode();
                    }
                    KeyCode::Char(c) => {
                        app.push_search_char(c);
                    }
                    KeyCode::Backspace => {
                        app.pop_search_char();
                    }
                    _ => {}
                },
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => {
                        app.should_quit = true;
                    }
                    KeyCode::Char('/') => {
                        app.enter_search_mode();
                    }
                    KeyCode::Esc => {
                        app.clear_search();
                    }
                    KeyCode::Char('s') => {
                        app.toggle_sort();
                    }
                    KeyCode::Char('v') => {
                        app.toggle_view();
                    }
                    KeyCode::Char('j') | KeyCode::Char('l') | KeyCode::Down | KeyCode::Right => {
                        app.next_card();
                    }
                    KeyCode::Char('k') | KeyCode::Char('h') | KeyCode::Up | KeyCode::Left => {
                        app.previous_card();
                    }
                    KeyCode::Tab | KeyCode::BackTab => {
                        app.toggle_focus();
                    }
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        if let Some(url) = app.activate() {
                            open_url(app, &url);
                        }
                    }
                    KeyCode::Char('g') => {
                        if let Some(url) = app.activate_repository_link() {
                            open_url(app, &url);
                        }
                    }
                    _ => {}
                },
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Fire-and-forget: each resolver reports back whenever it settles
fn schedule_favicons(
    app: &mut App,
    loader: &Arc<dyn IconLoader>,
    tx: &mpsc::UnboundedSender<Update>,
) {
    let pending = app.take_pending_favicons();
    debug!("Scheduling {} favicon resolutions", pending.len());

    for (url, resolver) in pending {
        let loader = Arc::clone(loader);
        let tx = tx.clone();
        tokio::spawn(async move {
            let source = resolver.resolve(loader.as_ref()).await;
            let _ = tx.send(Update::Favicon(url, source));
        });
    }
}

fn open_url(app: &mut App, url: &str) {
    if url.is_empty() {
        return;
    }
    info!("Opening {}", url);
    if let Err(e) = open::that(url) {
        app.error_message = Some(format!("Failed to open browser: {}", e));
    } else {
        app.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_failed_setup_is_undone() {
        let undone = Cell::new(false);
        let result: io::Result<()> = undo_on_error(
            || Err(io::Error::new(io::ErrorKind::Other, "no tty")),
            || undone.set(true),
        );
        assert!(result.is_err());
        assert!(undone.get());
    }

    #[test]
    fn test_successful_setup_is_kept() {
        let undone = Cell::new(false);
        let result = undo_on_error(|| Ok(7), || undone.set(true));
        assert_eq!(result.unwrap(), 7);
        assert!(!undone.get());
    }
}
