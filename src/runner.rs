//! Sequential test runner.
//!
//! Runs the selected models one at a time on a dedicated worker thread so
//! the UI stays responsive, and reports progress over an mpsc channel that
//! the UI event loop drains each tick. Cancellation is cooperative: the
//! flag is checked between model tests, never mid-request.

use crate::client::ModelTester;
use crate::report::{TestResult, ThinkingMode};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use tracing::{debug, info};

/// Notifications sent from worker threads to the UI loop.
#[derive(Debug)]
pub enum WorkerEvent {
    /// A model test is about to start. `current` is 1-based.
    Progress {
        /// 1-based index of the model being tested.
        current: usize,
        /// Number of models in this run.
        total: usize,
        /// Identifier of the model being tested.
        model: String,
    },
    /// One model test finished (successfully or not).
    TestFinished(TestResult),
    /// The run is over; carries every result produced, in order.
    RunCompleted(Vec<TestResult>),
    /// A model-list fetch finished.
    ModelsFetched(Result<Vec<String>, String>),
}

/// What to ask each model during a run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Models to test, in order.
    pub models: Vec<String>,
    /// User message sent to every model.
    pub message: String,
    /// Optional system prompt, sent first when present.
    pub system_prompt: Option<String>,
    /// Thinking mode for every request.
    pub thinking: ThinkingMode,
}

/// Handle to a running worker thread.
#[derive(Debug)]
pub struct RunnerHandle {
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl RunnerHandle {
    /// Request cooperative cancellation: no further model test will start.
    /// The test already in flight runs to completion.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the worker thread to exit.
    pub fn join(self) {
        let _ = self.thread.join();
    }
}

/// Spawn a worker thread that tests each requested model in order.
///
/// For every model the worker emits `Progress`, runs the test synchronously,
/// emits `TestFinished`, then checks the cancellation flag before moving on.
/// A final `RunCompleted` always follows, carrying the results produced so
/// far. Send failures (receiver dropped) end the run silently.
pub fn spawn<T>(tester: T, request: RunRequest, events: Sender<WorkerEvent>) -> RunnerHandle
where
    T: ModelTester + 'static,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);

    let thread = std::thread::spawn(move || {
        run(&tester, &request, &events, &flag);
    });

    RunnerHandle { cancel, thread }
}

fn run(
    tester: &dyn ModelTester,
    request: &RunRequest,
    events: &Sender<WorkerEvent>,
    cancel: &AtomicBool,
) {
    let total = request.models.len();
    let mut results = Vec::with_capacity(total);

    for (index, model) in request.models.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            info!(completed = results.len(), "run cancelled before next model");
            break;
        }

        if events
            .send(WorkerEvent::Progress {
                current: index + 1,
                total,
                model: model.clone(),
            })
            .is_err()
        {
            return;
        }

        debug!(model, index, "testing model");
        let result = tester.test_model(
            model,
            &request.message,
            request.system_prompt.as_deref(),
            request.thinking,
        );
        results.push(result.clone());

        if events.send(WorkerEvent::TestFinished(result)).is_err() {
            return;
        }
    }

    let _ = events.send(WorkerEvent::RunCompleted(results));
}
