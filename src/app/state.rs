//! Main application state.
//!
//! The `App` owns every piece of display state plus the receiving end of
//! the worker channel. Worker threads never mutate the UI; they send
//! [`WorkerEvent`]s that the event loop applies here between redraws.

use crate::app::{InputState, ModelList};
use crate::config::Config;
use crate::report::{TestResult, ThinkingMode};
use crate::runner::{RunnerHandle, WorkerEvent};
use std::sync::mpsc::{Receiver, Sender, channel};
use tracing::{info, warn};

/// Where a test run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run in progress.
    #[default]
    Idle,
    /// A worker thread is testing models.
    Running,
    /// Cancellation requested; the in-flight model test is finishing.
    Stopping,
}

/// Which text field an editing modal is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The bearer token for the vendor API.
    ApiKey,
    /// The optional system prompt sent before the user message.
    SystemPrompt,
    /// The user message sent to every model.
    UserMessage,
}

impl Field {
    /// Title shown on the editing modal.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ApiKey => "API key",
            Self::SystemPrompt => "System prompt",
            Self::UserMessage => "User message",
        }
    }
}

/// Which panel or field currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// API key field.
    #[default]
    ApiKey,
    /// System prompt field.
    SystemPrompt,
    /// User message field.
    UserMessage,
    /// Thinking mode selector.
    Thinking,
    /// Model checklist panel.
    Models,
}

impl Focus {
    const ORDER: &'static [Self] = &[
        Self::ApiKey,
        Self::SystemPrompt,
        Self::UserMessage,
        Self::Thinking,
        Self::Models,
    ];

    /// The next focus target (wraps around).
    #[must_use]
    pub fn next(self) -> Self {
        Self::step(self, 1)
    }

    /// The previous focus target (wraps around).
    #[must_use]
    pub fn prev(self) -> Self {
        Self::step(self, Self::ORDER.len() - 1)
    }

    fn step(current: Self, by: usize) -> Self {
        let index = Self::ORDER
            .iter()
            .position(|&f| f == current)
            .unwrap_or_default();
        Self::ORDER[(index + by) % Self::ORDER.len()]
    }
}

/// Application mode (which overlay, if any, captures input).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Normal operation; keys act on the focused panel.
    #[default]
    Normal,
    /// Editing one of the text fields in a modal.
    Editing(Field),
    /// Entering a new model identifier.
    AddingModel,
    /// Entering the CSV export path.
    ExportPrompt,
    /// Help overlay.
    Help,
    /// Error overlay with a message.
    Error(String),
    /// Informational overlay with a message.
    Notice(String),
    /// Quit requested while a run is active.
    ConfirmQuit,
}

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Application configuration
    pub config: Config,

    /// Bearer token for the vendor API (not persisted).
    pub api_key: String,

    /// System prompt sent before the user message when non-empty.
    pub system_prompt: String,

    /// User message sent to every model under test.
    pub user_message: String,

    /// Thinking mode sent with every request.
    pub thinking: ThinkingMode,

    /// Model checklist.
    pub models: ModelList,

    /// Cursor position within the model checklist.
    pub model_cursor: usize,

    /// Accumulated results, in receipt order.
    pub results: Vec<TestResult>,

    /// Current run state.
    pub run_state: RunState,

    /// Handle to the active runner thread, if any.
    pub runner: Option<RunnerHandle>,

    /// Whether a model-list fetch is in flight.
    pub fetching: bool,

    /// Current application mode
    pub mode: Mode,

    /// Current keyboard focus
    pub focus: Focus,

    /// Text input state for the editing modals.
    pub input: InputState,

    /// One-line status shown in the status bar.
    pub status: String,

    /// Whether the application should quit
    pub should_quit: bool,

    worker_tx: Sender<WorkerEvent>,
    worker_rx: Receiver<WorkerEvent>,
}

impl App {
    /// Create a new application from configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let (worker_tx, worker_rx) = channel();
        let models = ModelList::from_ids(&config.default_models);
        Self {
            config,
            api_key: String::new(),
            system_prompt: String::new(),
            user_message: "Who are you?".to_string(),
            thinking: ThinkingMode::default(),
            models,
            model_cursor: 0,
            results: Vec::new(),
            run_state: RunState::default(),
            runner: None,
            fetching: false,
            mode: Mode::default(),
            focus: Focus::default(),
            input: InputState::new(),
            status: "Ready".to_string(),
            should_quit: false,
            worker_tx,
            worker_rx,
        }
    }

    /// Sender that worker threads report back through.
    #[must_use]
    pub fn worker_sender(&self) -> Sender<WorkerEvent> {
        self.worker_tx.clone()
    }

    /// Whether a run is active (running or stopping).
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.run_state, RunState::Running | RunState::Stopping)
    }

    /// Apply every pending worker event. Called once per event-loop
    /// iteration; this is the UI-thread half of the worker-to-UI handoff.
    pub fn drain_worker_events(&mut self) {
        while let Ok(event) = self.worker_rx.try_recv() {
            self.apply_worker_event(event);
        }
    }

    /// Apply a single worker event to the display state.
    pub fn apply_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Progress {
                current,
                total,
                model,
            } => {
                self.status = format!("Testing {current}/{total}: {model}");
            }
            WorkerEvent::TestFinished(result) => {
                info!(
                    model = %result.model,
                    success = result.success,
                    "result received"
                );
                self.results.push(result);
            }
            WorkerEvent::RunCompleted(results) => {
                let stopped = self.run_state == RunState::Stopping;
                self.run_state = RunState::Idle;
                self.runner = None;
                self.status = if stopped {
                    format!("Stopped after {} model(s)", results.len())
                } else {
                    format!("Run complete: {} model(s) tested", results.len())
                };
            }
            WorkerEvent::ModelsFetched(outcome) => {
                self.fetching = false;
                match outcome {
                    Ok(ids) => {
                        let fetched = ids.len();
                        self.models.update(ids);
                        self.model_cursor = 0;
                        self.status = format!("Fetched {fetched} model(s)");
                    }
                    Err(error) => {
                        warn!(error, "model fetch failed");
                        self.mode = Mode::Error(format!("Model fetch failed: {error}"));
                        self.status = "Ready".to_string();
                    }
                }
            }
        }
    }

    /// Move the model cursor down, clamped to the list.
    pub fn model_cursor_down(&mut self) {
        if self.model_cursor + 1 < self.models.len() {
            self.model_cursor += 1;
        }
    }

    /// Move the model cursor up.
    pub fn model_cursor_up(&mut self) {
        self.model_cursor = self.model_cursor.saturating_sub(1);
    }

    /// Clamp the model cursor after the list shrank.
    pub fn clamp_model_cursor(&mut self) {
        if self.model_cursor >= self.models.len() {
            self.model_cursor = self.models.len().saturating_sub(1);
        }
    }

    /// Leave any modal mode and return to normal operation.
    pub fn exit_mode(&mut self) {
        self.mode = Mode::Normal;
        self.input.clear();
    }
}
