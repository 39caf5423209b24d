//! Centered modal overlays: text editing, help, errors, notices.

use crate::app::{App, Mode};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::colors;

/// Render whichever overlay the current mode calls for.
pub fn render_overlays(frame: &mut Frame<'_>, app: &App) {
    match &app.mode {
        Mode::Normal => {}
        Mode::Editing(field) => input_modal(frame, app, field.title()),
        Mode::AddingModel => input_modal(frame, app, "Add model"),
        Mode::ExportPrompt => input_modal(frame, app, "Export CSV to"),
        Mode::Help => help_modal(frame),
        Mode::Error(message) => {
            message_modal(frame, "Error", message, colors::MODAL_BORDER_ERROR);
        }
        Mode::Notice(message) => {
            message_modal(frame, "Info", message, colors::MODAL_BORDER_INFO);
        }
        Mode::ConfirmQuit => message_modal(
            frame,
            "Quit",
            "A run is in progress. Quit anyway? (y/n)",
            colors::MODAL_BORDER_WARNING,
        ),
    }
}

/// A centered rect with absolute dimensions, clamped to the frame.
fn centered_rect_absolute(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

/// Single-line text input with a visible cursor.
fn input_modal(frame: &mut Frame<'_>, app: &App, title: &str) {
    let area = centered_rect_absolute(60, 3, frame.area());
    frame.render_widget(Clear, area);

    let before = &app.input.buffer[..app.input.cursor];
    let after = &app.input.buffer[app.input.cursor..];
    let mut spans = vec![Span::styled(
        before,
        Style::default().fg(colors::TEXT_PRIMARY),
    )];
    if let Some(under_cursor) = after.chars().next() {
        let rest = &after[under_cursor.len_utf8()..];
        spans.push(Span::styled(
            under_cursor.to_string(),
            Style::default().add_modifier(Modifier::REVERSED),
        ));
        spans.push(Span::styled(rest, Style::default().fg(colors::TEXT_PRIMARY)));
    } else {
        spans.push(Span::styled(
            "_",
            Style::default().fg(colors::TEXT_DIM),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::FOCUS))
            .style(Style::default().bg(colors::MODAL_BG)),
    );
    frame.render_widget(paragraph, area);
}

fn message_modal(frame: &mut Frame<'_>, title: &str, message: &str, border: ratatui::style::Color) {
    let area = centered_rect_absolute(64, 6, frame.area());
    frame.render_widget(Clear, area);

    let paragraph = Paragraph::new(message.to_string())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(colors::TEXT_PRIMARY))
        .block(
            Block::default()
                .title(format!(" {title} "))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .style(Style::default().bg(colors::MODAL_BG)),
        );
    frame.render_widget(paragraph, area);
}

fn help_modal(frame: &mut Frame<'_>) {
    const KEYS: &[(&str, &str)] = &[
        ("Tab / Shift-Tab", "move focus"),
        ("Enter", "edit focused field / toggle model"),
        ("Space", "toggle model under cursor"),
        ("a / n", "check all / uncheck all models"),
        ("m / d", "add / delete model"),
        ("t", "cycle thinking mode"),
        ("s / x", "start / stop run"),
        ("f", "fetch model list"),
        ("e", "export results to CSV"),
        ("q", "quit"),
    ];

    let height = u16::try_from(KEYS.len()).unwrap_or(10) + 3;
    let area = centered_rect_absolute(52, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = Vec::with_capacity(KEYS.len() + 1);
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(colors::TEXT_MUTED),
    )));
    for (key, action) in KEYS {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{key:>16}  "),
                Style::default().fg(colors::FOCUS),
            ),
            Span::styled(*action, Style::default().fg(colors::TEXT_PRIMARY)),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::BORDER))
            .style(Style::default().bg(colors::MODAL_BG)),
    );
    frame.render_widget(paragraph, area);
}
