use crate::app::{App, Control, Focus};
use crate::render::{display_text, TaskItemView};
use crate::storage::KeyValueStore;
use crate::task::Status;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;

const BORDER_NEUTRAL: Color = Color::Gray;
const BORDER_INVALID: Color = Color::Red;
const BORDER_FOCUSED: Color = Color::Cyan;

pub fn run_app<B: Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) == Control::Quit {
                return Ok(());
            }
        }
    }
}

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_title_field(f, app, chunks[0]);
    draw_description_field(f, app, chunks[1]);
    draw_date_and_status(f, app, chunks[2]);

    let summary = app.view.summary.clone().unwrap_or_default();
    f.render_widget(
        Paragraph::new(summary).style(Style::default().add_modifier(Modifier::BOLD)),
        chunks[3],
    );

    draw_task_list(f, app, chunks[4]);
    draw_footer(f, app, chunks[5]);
}

fn field_block(title: &str, focused: bool, invalid: bool) -> Block<'_> {
    let color = if invalid {
        BORDER_INVALID
    } else if focused {
        BORDER_FOCUSED
    } else {
        BORDER_NEUTRAL
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn error_line(message: Option<&str>) -> Line<'_> {
    Line::from(Span::styled(
        message.unwrap_or_default(),
        Style::default().fg(BORDER_INVALID),
    ))
}

/// Column just past `text` inside a bordered field, kept within the border.
fn cursor_x(area: Rect, text: &str) -> u16 {
    let width = u16::try_from(Line::from(text).width()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(width)
        .min(area.right().saturating_sub(2))
}

fn place_cursor(f: &mut Frame, area: Rect, text: &str) {
    f.set_cursor_position((cursor_x(area, text), area.y + 1));
}

fn draw_title_field<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let focused = app.focus == Focus::Title;
    let error = app.form.title_error();
    let title = display_text(&app.form.title);
    let field = Paragraph::new(vec![
        Line::from(Span::raw(&*title)),
        error_line(error),
    ])
    .block(field_block("Task title", focused, error.is_some()));
    f.render_widget(field, area);
    if focused {
        place_cursor(f, area, &title);
    }
}

fn draw_description_field<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let focused = app.focus == Focus::Description;
    let description = display_text(&app.form.description);
    let field = Paragraph::new(Span::raw(&*description))
        .block(field_block("Description", focused, false));
    f.render_widget(field, area);
    if focused {
        place_cursor(f, area, &description);
    }
}

fn draw_date_and_status<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let focused = app.focus == Focus::Date;
    let error = app.form.date_error();
    let date_text = display_text(&app.form.date);
    let mut spans = vec![Span::raw(&*date_text)];
    if let Some(message) = error {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(message, Style::default().fg(BORDER_INVALID)));
    }
    let date = Paragraph::new(Line::from(spans))
        .block(field_block("Date (YYYY-MM-DD)", focused, error.is_some()));
    f.render_widget(date, chunks[0]);
    if focused {
        place_cursor(f, chunks[0], &date_text);
    }

    let status = Paragraph::new(status_selector(app.form.status))
        .block(field_block("Status", app.focus == Focus::Status, false));
    f.render_widget(status, chunks[1]);
}

fn status_style(status: Status) -> Style {
    let color = match status {
        Status::Planned => Color::Yellow,
        Status::InProgress => Color::Blue,
        Status::Completed => Color::Green,
    };
    Style::default().fg(color)
}

/// Every choice is listed; the current one is highlighted.
fn status_selector(current: Status) -> Line<'static> {
    let mut spans = Vec::new();
    for status in Status::ALL {
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        let label = status.label();
        if status == current {
            spans.push(Span::styled(
                format!("[{label}]"),
                status_style(status).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(
                format!(" {label} "),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }
    Line::from(spans)
}

fn task_item(item: &TaskItemView) -> ListItem<'_> {
    let mut lines = vec![Line::from(Span::styled(
        item.title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(description) = &item.description {
        lines.push(Line::from(Span::raw(description.as_str())));
    }
    let mut meta = vec![
        Span::styled("Date: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(item.date.as_str()),
        Span::raw("   Status: "),
    ];
    meta.extend(status_selector(item.status).spans);
    lines.push(Line::from(meta));
    lines.push(Line::default());
    ListItem::new(lines)
}

fn draw_task_list<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let focused = app.focus == Focus::List;
    let items: Vec<ListItem> = app.view.items.iter().map(task_item).collect();
    let list = List::new(items)
        .block(field_block("Tasks", focused, false))
        .highlight_symbol("> ")
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if focused && !app.view.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_footer<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let line = match &app.notice {
        Some(notice) => Line::from(Span::styled(
            display_text(notice),
            Style::default().fg(BORDER_INVALID),
        )),
        None if app.focus == Focus::List => Line::from(
            "Up/Down select  Left/Right status  d delete  Tab form  q quit",
        ),
        None => Line::from("Tab next field  Enter add task  Esc quit"),
    };
    f.render_widget(Paragraph::new(line), area);
}
