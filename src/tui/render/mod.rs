//! Frame rendering: input panel, model checklist, results table, status bar.

mod colors;
mod modals;

use crate::app::{App, Focus, RunState};
use crate::report::{LatencyBand, TestResult, format_ms};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table},
};

/// Render the whole frame.
pub fn render(frame: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_inputs(frame, app, chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(chunks[1]);
    render_models(frame, app, middle[0]);
    render_results(frame, app, middle[1]);

    render_status_bar(frame, app, chunks[2]);
    modals::render_overlays(frame, app);
}

fn field_line<'a>(label: &'a str, value: String, focused: bool, dim_value: bool) -> Line<'a> {
    let marker = if focused { "▶ " } else { "  " };
    let label_style = if focused {
        Style::default()
            .fg(colors::FOCUS)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::TEXT_DIM)
    };
    let value_style = if dim_value {
        Style::default().fg(colors::TEXT_MUTED)
    } else {
        Style::default().fg(colors::TEXT_PRIMARY)
    };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(colors::FOCUS)),
        Span::styled(format!("{label:<14}"), label_style),
        Span::styled(value, value_style),
    ])
}

fn render_inputs(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let api_key = if app.api_key.is_empty() {
        "(not set)".to_string()
    } else {
        "•".repeat(app.api_key.chars().count())
    };
    let system_prompt = if app.system_prompt.is_empty() {
        "(none)".to_string()
    } else {
        single_line(&app.system_prompt)
    };

    let lines = vec![
        field_line(
            "API key",
            api_key,
            app.focus == Focus::ApiKey,
            app.api_key.is_empty(),
        ),
        field_line(
            "System prompt",
            system_prompt,
            app.focus == Focus::SystemPrompt,
            app.system_prompt.is_empty(),
        ),
        field_line(
            "Message",
            single_line(&app.user_message),
            app.focus == Focus::UserMessage,
            false,
        ),
        field_line(
            "Thinking",
            app.thinking.label().to_string(),
            app.focus == Focus::Thinking,
            false,
        ),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Request ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::BORDER)),
    );
    frame.render_widget(paragraph, area);
}

fn render_models(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let focused = app.focus == Focus::Models;
    let items: Vec<ListItem<'_>> = app
        .models
        .iter()
        .map(|entry| {
            let check = if entry.checked { "[x] " } else { "[ ] " };
            let style = if entry.checked {
                Style::default().fg(colors::TEXT_PRIMARY)
            } else {
                Style::default().fg(colors::TEXT_DIM)
            };
            ListItem::new(Line::from(vec![
                Span::styled(check, Style::default().fg(colors::FOCUS)),
                Span::styled(entry.id.clone(), style),
            ]))
        })
        .collect();

    let border = if focused { colors::FOCUS } else { colors::BORDER };
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Models ({} checked) ", app.models.checked_ids().len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
        .highlight_style(
            Style::default()
                .bg(colors::SURFACE_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if focused && !app.models.is_empty() {
        state.select(Some(app.model_cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn result_row(result: &TestResult) -> Row<'static> {
    let time = result.timestamp.format("%H:%M:%S").to_string();

    if result.success {
        let first_cell = result.first_token_time.map_or_else(
            || Cell::from("N/A"),
            |d| Cell::from(format_ms(d)).style(Style::default().fg(band_color(LatencyBand::for_first_token(d)))),
        );
        let total_cell = result.total_time.map_or_else(
            || Cell::from("N/A"),
            |d| Cell::from(format_ms(d)).style(Style::default().fg(band_color(LatencyBand::for_total(d)))),
        );
        Row::new(vec![
            Cell::from(result.model.clone()),
            first_cell,
            total_cell,
            Cell::from(result.response_length.to_string()),
            Cell::from("ok").style(Style::default().fg(colors::STATUS_OK)),
            Cell::from(time),
        ])
    } else {
        let error = result.error.clone().unwrap_or_default();
        Row::new(vec![
            Cell::from(result.model.clone()),
            Cell::from("N/A"),
            Cell::from("N/A"),
            Cell::from("N/A"),
            Cell::from(format!("failed: {error}")).style(Style::default().fg(colors::STATUS_FAIL)),
            Cell::from(time),
        ])
    }
}

const fn band_color(band: LatencyBand) -> ratatui::style::Color {
    match band {
        LatencyBand::Fast => colors::LAT_FAST,
        LatencyBand::Normal => colors::TEXT_PRIMARY,
        LatencyBand::Slow => colors::LAT_SLOW,
    }
}

fn render_results(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let header = Row::new(vec![
        "Model",
        "First token (ms)",
        "Total (ms)",
        "Length",
        "Status",
        "Time",
    ])
    .style(
        Style::default()
            .fg(colors::TEXT_DIM)
            .add_modifier(Modifier::BOLD),
    );

    // Keep the newest rows visible once the table outgrows the pane.
    let visible = area.height.saturating_sub(3) as usize;
    let skip = app.results.len().saturating_sub(visible.max(1));
    let rows: Vec<Row<'_>> = app.results.iter().skip(skip).map(result_row).collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(28),
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Percentage(28),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!(" Results ({}) ", app.results.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::BORDER)),
    );
    frame.render_widget(table, area);
}

fn render_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let state_label = match app.run_state {
        RunState::Idle => "idle",
        RunState::Running => "running",
        RunState::Stopping => "stopping",
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {state_label} "),
            Style::default()
                .fg(colors::FOCUS)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.status.clone(), Style::default().fg(colors::TEXT_PRIMARY)),
        Span::styled(
            "   s start  x stop  e export  ? help",
            Style::default().fg(colors::TEXT_MUTED),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn single_line(text: &str) -> String {
    text.replace('\n', " ")
}
