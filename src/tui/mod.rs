//! Terminal user interface for tokmeter.
//!
//! One UI thread runs the draw/input loop; worker threads report through
//! the app's mpsc channel and are drained at the top of every iteration.

mod render;

use crate::app::{Actions, App, Event, Field, Focus, Handler, Mode};
use anyhow::Result;
use ratatui::crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;

/// Run the TUI application until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be configured or drawing fails.
pub fn run(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let event_handler = Handler::new(app.config.poll_interval_ms);
    let actions = Actions::new();

    let result = run_loop(&mut terminal, &mut app, &event_handler, actions);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_handler: &Handler,
    actions: Actions,
) -> Result<()> {
    loop {
        app.drain_worker_events();
        terminal.draw(|frame| render::render(frame, app))?;

        match event_handler.next()? {
            Event::Tick | Event::Resize(_, _) => {}
            Event::Key(key) => handle_key(app, actions, key),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, actions: Actions, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    let mode = app.mode.clone();
    match mode {
        Mode::Normal => handle_normal_key(app, actions, key.code),
        Mode::Editing(field) => handle_input_key(app, actions, key.code, InputTarget::Field(field)),
        Mode::AddingModel => handle_input_key(app, actions, key.code, InputTarget::NewModel),
        Mode::ExportPrompt => handle_input_key(app, actions, key.code, InputTarget::ExportPath),
        Mode::Help | Mode::Error(_) | Mode::Notice(_) => app.exit_mode(),
        Mode::ConfirmQuit => match key.code {
            KeyCode::Char('y' | 'Y') => {
                actions.stop_test(app);
                app.should_quit = true;
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => app.exit_mode(),
            _ => {}
        },
    }
}

fn handle_normal_key(app: &mut App, actions: Actions, code: KeyCode) {
    match code {
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.prev(),
        KeyCode::Char('q') | KeyCode::Esc => actions.request_quit(app),
        KeyCode::Char('s') => actions.start_test(app),
        KeyCode::Char('x') => actions.stop_test(app),
        KeyCode::Char('e') => actions.begin_export(app),
        KeyCode::Char('f') => actions.fetch_models(app),
        KeyCode::Char('t') => app.thinking = app.thinking.next(),
        KeyCode::Char('?') => app.mode = Mode::Help,
        KeyCode::Char('m') => {
            app.input.clear();
            app.mode = Mode::AddingModel;
        }
        KeyCode::Enter => match app.focus {
            Focus::ApiKey => actions.begin_edit(app, Field::ApiKey),
            Focus::SystemPrompt => actions.begin_edit(app, Field::SystemPrompt),
            Focus::UserMessage => actions.begin_edit(app, Field::UserMessage),
            Focus::Thinking => app.thinking = app.thinking.next(),
            Focus::Models => app.models.toggle(app.model_cursor),
        },
        KeyCode::Up if app.focus == Focus::Models => app.model_cursor_up(),
        KeyCode::Down if app.focus == Focus::Models => app.model_cursor_down(),
        KeyCode::Char(' ') if app.focus == Focus::Models => app.models.toggle(app.model_cursor),
        KeyCode::Char('a') if app.focus == Focus::Models => app.models.check_all(),
        KeyCode::Char('n') if app.focus == Focus::Models => app.models.clear_checks(),
        KeyCode::Char('d') if app.focus == Focus::Models => actions.remove_model(app),
        _ => {}
    }
}

/// What an input modal commits to on Enter.
#[derive(Debug, Clone, Copy)]
enum InputTarget {
    Field(Field),
    NewModel,
    ExportPath,
}

fn handle_input_key(app: &mut App, actions: Actions, code: KeyCode, target: InputTarget) {
    match code {
        KeyCode::Enter => match target {
            InputTarget::Field(field) => actions.finish_edit(app, field),
            InputTarget::NewModel => actions.finish_add_model(app),
            InputTarget::ExportPath => actions.finish_export(app),
        },
        KeyCode::Esc => app.exit_mode(),
        KeyCode::Char(c) => app.input.insert_char(c),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.cursor_left(),
        KeyCode::Right => app.input.cursor_right(),
        KeyCode::Home => app.input.cursor_home(),
        KeyCode::End => app.input.cursor_end(),
        _ => {}
    }
}
