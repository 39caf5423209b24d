//! User actions: starting and stopping runs, fetching models, exporting.
//!
//! Validation failures are local: they set a status-line prompt and issue
//! no request. Nothing here is fatal; the app always returns to an idle,
//! retryable state.

use crate::app::{App, Field, Mode, RunState};
use crate::client::LatencyClient;
use crate::export;
use crate::runner::{self, RunRequest, WorkerEvent};
use std::path::Path;
use tracing::info;

/// Stateless action handler, invoked by the key dispatcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actions;

impl Actions {
    /// Create a new action handler
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validate inputs and start a sequential test run on a worker thread.
    ///
    /// Rejected locally (status-line prompt, no request issued) when the
    /// API key, the model selection, or the user message is empty, or when
    /// a run is already active.
    pub fn start_test(self, app: &mut App) {
        if app.is_running() {
            app.status = "A run is already in progress".to_string();
            return;
        }
        if app.api_key.trim().is_empty() {
            app.status = "Enter an API key first".to_string();
            return;
        }
        let models = app.models.checked_ids();
        if models.is_empty() {
            app.status = "Select at least one model".to_string();
            return;
        }
        if app.user_message.trim().is_empty() {
            app.status = "Enter a user message".to_string();
            return;
        }

        let client = LatencyClient::new(app.api_key.trim(), &app.config);
        let system_prompt = if app.system_prompt.trim().is_empty() {
            None
        } else {
            Some(app.system_prompt.clone())
        };
        let request = RunRequest {
            models,
            message: app.user_message.clone(),
            system_prompt,
            thinking: app.thinking,
        };

        info!(models = request.models.len(), "starting test run");
        let handle = runner::spawn(client, request, app.worker_sender());
        app.runner = Some(handle);
        app.run_state = RunState::Running;
        app.status = "Starting run...".to_string();
    }

    /// Request cooperative cancellation of the active run.
    ///
    /// The model test already in flight finishes; no further model starts.
    pub fn stop_test(self, app: &mut App) {
        if app.run_state != RunState::Running {
            app.status = "No run in progress".to_string();
            return;
        }
        if let Some(handle) = &app.runner {
            handle.cancel();
        }
        app.run_state = RunState::Stopping;
        app.status = "Stopping after the current model...".to_string();
    }

    /// Fetch the model list from the vendor on a worker thread.
    ///
    /// At most one fetch runs at a time; a second request while one is in
    /// flight is rejected with a status prompt.
    pub fn fetch_models(self, app: &mut App) {
        if app.fetching {
            app.status = "A model fetch is already in progress".to_string();
            return;
        }
        if app.api_key.trim().is_empty() {
            app.status = "Enter an API key first".to_string();
            return;
        }

        let client = LatencyClient::new(app.api_key.trim(), &app.config);
        let events = app.worker_sender();
        app.fetching = true;
        app.status = "Fetching models...".to_string();

        std::thread::spawn(move || {
            let outcome = client.fetch_models().map_err(|e| e.to_string());
            let _ = events.send(WorkerEvent::ModelsFetched(outcome));
        });
    }

    /// Open the export-path prompt, unless there is nothing to export.
    pub fn begin_export(self, app: &mut App) {
        if app.results.is_empty() {
            app.status = "No results to export".to_string();
            return;
        }
        app.input.set("tokmeter-results.csv".to_string());
        app.mode = Mode::ExportPrompt;
    }

    /// Write the accumulated results to the path in the input buffer.
    ///
    /// I/O failure is reported in an error overlay; the in-memory results
    /// are unaffected.
    pub fn finish_export(self, app: &mut App) {
        let path = app.input.buffer.trim().to_string();
        app.exit_mode();
        if path.is_empty() {
            app.status = "Export cancelled: empty path".to_string();
            return;
        }
        match export::write_csv(&app.results, Path::new(&path)) {
            Ok(()) => {
                app.mode = Mode::Notice(format!("Results exported to {path}"));
                app.status = "Ready".to_string();
            }
            Err(e) => {
                app.mode = Mode::Error(format!("Export failed: {e}"));
            }
        }
    }

    /// Open the editing modal for a text field, seeded with its value.
    pub fn begin_edit(self, app: &mut App, field: Field) {
        let current = match field {
            Field::ApiKey => app.api_key.clone(),
            Field::SystemPrompt => app.system_prompt.clone(),
            Field::UserMessage => app.user_message.clone(),
        };
        app.input.set(current);
        app.mode = Mode::Editing(field);
    }

    /// Commit the editing modal's buffer back to its field.
    pub fn finish_edit(self, app: &mut App, field: Field) {
        let value = app.input.buffer.clone();
        match field {
            Field::ApiKey => app.api_key = value,
            Field::SystemPrompt => app.system_prompt = value,
            Field::UserMessage => app.user_message = value,
        }
        app.exit_mode();
    }

    /// Add the model identifier in the input buffer to the checklist.
    pub fn finish_add_model(self, app: &mut App) {
        let id = app.input.buffer.clone();
        app.exit_mode();
        if app.models.add(&id) {
            app.status = format!("Added {}", id.trim());
        } else {
            app.status = "Model is blank or already listed".to_string();
        }
    }

    /// Remove the model under the cursor.
    pub fn remove_model(self, app: &mut App) {
        if app.models.is_empty() {
            return;
        }
        app.models.remove(app.model_cursor);
        app.clamp_model_cursor();
    }

    /// Quit, or ask for confirmation when a run is active.
    pub fn request_quit(self, app: &mut App) {
        if app.is_running() {
            app.mode = Mode::ConfirmQuit;
        } else {
            app.should_quit = true;
        }
    }
}
