//! Drawing of the todo screen.

use super::keys::Mode;
use super::App;
use crate::types::Filter;
use crate::view::{TodoRow, TodoView};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const INPUT_PLACEHOLDER: &str = "What needs to be done?";

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn selected_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

/// Draw the whole screen
pub(super) fn draw(frame: &mut Frame<'_>, app: &App) {
    let view = app.view();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(u16::from(view.error.is_some())),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    if let Some(error) = &view.error {
        draw_banner(frame, error, chunks[0]);
    }
    draw_header(frame, app, chunks[1]);
    draw_list(frame, app, chunks[2]);
    if view.show_footer {
        draw_footer(frame, view, chunks[3]);
    }
    draw_help(frame, app.mode(), chunks[4]);
}

fn draw_banner(frame: &mut Frame<'_>, error: &str, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {error} "),
            Style::default().fg(Color::White).bg(Color::Red),
        ),
        Span::styled("  x to dismiss", dim()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_header(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let view = app.view();
    let focused = app.mode() == Mode::Input;

    let mut spans = Vec::new();
    if view.show_toggle_all {
        let style = if view.all_completed {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            dim()
        };
        spans.push(Span::styled("❯ ", style));
    }

    if view.draft.is_empty() {
        spans.push(Span::styled(INPUT_PLACEHOLDER, dim().add_modifier(Modifier::ITALIC)));
    } else {
        let style = if view.input_locked { dim() } else { Style::default() };
        spans.push(Span::styled(view.draft.as_str(), style));
    }

    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        dim()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(" todos ");
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);

    if focused && !view.input_locked {
        let prefix = if view.show_toggle_all { 2 } else { 0 };
        let offset = u16::try_from(view.draft.chars().count() + prefix).unwrap_or(u16::MAX);
        frame.set_cursor_position((
            area.x.saturating_add(1).saturating_add(offset),
            area.y.saturating_add(1),
        ));
    }
}

fn row_line<'a>(row: &'a TodoRow, app: &'a App, selected: bool) -> Line<'a> {
    let checkbox = if row.completed { "[x] " } else { "[ ] " };
    let mut spans = vec![Span::styled(
        checkbox,
        if row.locked() { dim() } else { Style::default() },
    )];

    match app.edit().filter(|edit| edit.id == row.id) {
        Some(edit) => {
            spans.push(Span::styled(
                edit.text.as_str(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED),
            ));
        },
        None => {
            let style = if row.completed {
                dim().add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            spans.push(Span::styled(row.title.as_str(), style));
        },
    }

    if row.busy {
        spans.push(Span::styled("  ⟳", Style::default().fg(Color::Yellow)));
    }

    let line = Line::from(spans);
    if selected { line.style(selected_style()) } else { line }
}

fn draw_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let view = app.view();
    let list_focused = matches!(app.mode(), Mode::List | Mode::Edit);

    let lines: Vec<Line<'_>> = view
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| row_line(row, app, list_focused && index == app.cursor()))
        .collect();

    let border = if list_focused {
        Style::default().fg(Color::Cyan)
    } else {
        dim()
    };
    let block = Block::default().borders(Borders::ALL).border_style(border);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(frame: &mut Frame<'_>, view: &TodoView, area: Rect) {
    let mut spans = vec![Span::raw(view.remaining_label()), Span::raw("   ")];

    for (index, filter) in Filter::ALL.into_iter().enumerate() {
        let style = if filter == view.filter {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("{} {}", index + 1, filter.label()), style));
        spans.push(Span::raw("  "));
    }

    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        "Clear completed",
        if view.can_clear_completed {
            Style::default()
        } else {
            dim()
        },
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(frame: &mut Frame<'_>, mode: Mode, area: Rect) {
    let help = match mode {
        Mode::Input => "enter add · tab list · ctrl-c quit",
        Mode::List => {
            "↑↓ select · space toggle · d delete · e edit · a all · c clear · 1-3 filter · x dismiss · q quit"
        },
        Mode::Edit => "enter/tab save · esc cancel",
    };
    frame.render_widget(Paragraph::new(Span::styled(help, dim())), area);
}
