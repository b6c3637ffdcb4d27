// UI rendering logic
use crate::{App, InputMode};
use pagedir_core::card::{REPO_LINK_LABEL, SiteCard};
use pagedir_core::{CardTarget, StatusKind, ViewMode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

const TILE_WIDTH: u16 = 34;
const TILE_HEIGHT: u16 = 6;

pub fn render(frame: &mut Frame, app: &mut App) {
    let status_height = if app.controller.status().is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Header
            Constraint::Length(3),             // Search input
            Constraint::Length(status_height), // Status message
            Constraint::Min(5),                // Cards
            Constraint::Length(1),             // Key help
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_search_input(frame, app, chunks[1]);
    if status_height > 0 {
        render_status(frame, app, chunks[2]);
    }

    match app.controller.view_mode() {
        ViewMode::List => render_list(frame, app, chunks[3]),
        ViewMode::Tiles => render_tiles(frame, app, chunks[3]),
    }

    render_help_bar(frame, app, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(
            format!("{} ", app.controller.owner()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("· GitHub Pages ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("({})", app.count_label()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(
        Paragraph::new(title).block(Block::default().borders(Borders::ALL)),
        header_chunks[0],
    );

    let sort = app.controller.sort_label();
    let view = app.controller.view_label();
    let toggles = Line::from(vec![
        toggle_span(sort.text, sort.pressed),
        Span::raw("  "),
        toggle_span(view.text, view.pressed),
    ]);

    frame.render_widget(
        Paragraph::new(toggles)
            .alignment(Alignment::Right)
            .block(Block::default().borders(Borders::ALL)),
        header_chunks[1],
    );
}

fn toggle_span(text: &'static str, pressed: bool) -> Span<'static> {
    let style = if pressed {
        Style::default().fg(Color::Black).bg(Color::Magenta).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Magenta)
    };
    Span::styled(format!(" {} ", text), style)
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_style = match app.input_mode {
        InputMode::Searching => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default(),
    };

    let input = Paragraph::new(app.search_input())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(" Search "));
    frame.render_widget(input, area);

    if app.input_mode == InputMode::Searching {
        let cursor_x = area.x + 1 + app.search_input().chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let Some(status) = app.controller.status() else {
        return;
    };

    let color = match status.kind() {
        StatusKind::Info => Color::Cyan,
        StatusKind::Error => Color::Red,
    };

    let paragraph = Paragraph::new(Line::from(Span::styled(
        status.text(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}

/// Date, repository link, language, stars
fn meta_line(card: &SiteCard, link_focused: bool) -> Line<'_> {
    let link_style = if link_focused {
        Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED)
    };

    Line::from(vec![
        Span::styled(card.updated.as_str(), Style::default().fg(Color::Rgb(128, 128, 128))),
        Span::raw("  •  "),
        Span::styled(REPO_LINK_LABEL, link_style),
        Span::raw("  •  "),
        Span::styled(card.language.as_str(), Style::default().fg(Color::Rgb(147, 112, 219))),
        Span::raw("  •  "),
        Span::styled(card.stars_label(), Style::default().fg(Color::Rgb(255, 215, 0))),
    ])
}

fn title_line<'a>(app: &App, card: &'a SiteCard, selected: bool) -> Line<'a> {
    let icon = app.favicon_status(card);
    let name_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };

    Line::from(vec![
        Span::styled(icon.glyph(), Style::default().fg(Color::Rgb(99, 102, 241))),
        Span::raw(" "),
        Span::styled(card.title.as_str(), name_style),
    ])
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max && max > 3 {
        let cut: String = text.chars().take(max - 3).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let desc_max = area.width.saturating_sub(10) as usize;
    let link_focused = app.focus == CardTarget::RepositoryLink;

    let items: Vec<ListItem> = app
        .cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let selected = i == app.selected_index;
            let description = format!("  {}", truncate(&card.description, desc_max));

            let mut meta = meta_line(card, selected && link_focused);
            meta.spans.insert(0, Span::raw("  "));

            ListItem::new(vec![
                title_line(app, card, selected),
                Line::from(Span::styled(
                    description,
                    Style::default().fg(Color::Rgb(105, 105, 105)),
                )),
                meta,
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Sites "))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_tiles(frame: &mut Frame, app: &App, area: Rect) {
    let outer = Block::default().borders(Borders::ALL).title(" Sites ");
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    if app.cards.is_empty() || inner.width == 0 || inner.height == 0 {
        return;
    }

    let columns = (inner.width / TILE_WIDTH).max(1) as usize;
    let visible_rows = (inner.height / TILE_HEIGHT).max(1) as usize;
    let tile_width = inner.width / columns as u16;

    // Scroll so the selected tile's row is on screen
    let selected_row = app.selected_index / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);
    let link_focused = app.focus == CardTarget::RepositoryLink;

    for (i, card) in app.cards.iter().enumerate().skip(first_row * columns) {
        let row = i / columns - first_row;
        if row >= visible_rows {
            break;
        }
        let col = i % columns;

        let top = inner.y + row as u16 * TILE_HEIGHT;
        let tile_area = Rect {
            x: inner.x + col as u16 * tile_width,
            y: top,
            width: tile_width,
            height: TILE_HEIGHT.min(inner.bottom().saturating_sub(top)),
        };

        let selected = i == app.selected_index;
        let border_style = if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let lines = vec![
            title_line(app, card, selected),
            Line::from(Span::styled(
                card.description.as_str(),
                Style::default().fg(Color::Rgb(105, 105, 105)),
            )),
            meta_line(card, selected && link_focused),
        ];

        let tile = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(border_style));
        frame.render_widget(tile, tile_area);
    }
}

fn render_help_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error_message {
        Span::styled(error.as_str(), Style::default().fg(Color::Red))
    } else {
        match app.input_mode {
            InputMode::Searching => Span::styled(
                "SEARCH | type to filter | ENTER/ESC: done",
                Style::default().fg(Color::Yellow),
            ),
            InputMode::Normal => Span::raw(
                "j/k: navigate | /: search | s: sort | v: view | TAB: focus link | ENTER: open | g: GitHub | q: quit",
            ),
        }
    };

    frame.render_widget(Paragraph::new(Line::from(status)), area);
}
