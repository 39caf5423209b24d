//! Per-model test results and latency classification.
//!
//! A [`TestResult`] is created once per model test by the streaming client
//! and is immutable afterwards. The UI appends results in receipt order and
//! colors timing cells by [`LatencyBand`].

use chrono::{DateTime, Local};
use std::time::Duration;

/// How many characters of the accumulated response to keep as a preview.
pub const PREVIEW_CHARS: usize = 100;

/// First-token time below this is considered fast.
pub const FIRST_TOKEN_FAST: Duration = Duration::from_secs(1);
/// First-token time above this is considered slow.
pub const FIRST_TOKEN_SLOW: Duration = Duration::from_secs(3);
/// Total time below this is considered fast.
pub const TOTAL_FAST: Duration = Duration::from_secs(3);
/// Total time above this is considered slow.
pub const TOTAL_SLOW: Duration = Duration::from_secs(10);

/// Request-level option controlling whether the model emits intermediate
/// reasoning text separately from final content.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ThinkingMode {
    /// Ask the vendor to suppress reasoning output.
    Disabled,
    /// Leave the decision to the vendor (the `thinking` field is omitted
    /// from the request body).
    #[default]
    Auto,
    /// Ask the vendor to emit reasoning output.
    Enabled,
}

impl ThinkingMode {
    /// All modes, in cycle order.
    pub const ALL: &'static [Self] = &[Self::Disabled, Self::Auto, Self::Enabled];

    /// Wire label used in the request body and the UI.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Auto => "auto",
            Self::Enabled => "enabled",
        }
    }

    /// The next mode in cycle order (wraps around).
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Disabled => Self::Auto,
            Self::Auto => Self::Enabled,
            Self::Enabled => Self::Disabled,
        }
    }
}

/// Informational latency classification used for color cues only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyBand {
    /// Below the fast threshold.
    Fast,
    /// Between the thresholds.
    Normal,
    /// Above the slow threshold.
    Slow,
}

impl LatencyBand {
    /// Classify a first-token time (<1s fast, >3s slow).
    #[must_use]
    pub fn for_first_token(elapsed: Duration) -> Self {
        Self::classify(elapsed, FIRST_TOKEN_FAST, FIRST_TOKEN_SLOW)
    }

    /// Classify a total completion time (<3s fast, >10s slow).
    #[must_use]
    pub fn for_total(elapsed: Duration) -> Self {
        Self::classify(elapsed, TOTAL_FAST, TOTAL_SLOW)
    }

    fn classify(elapsed: Duration, fast: Duration, slow: Duration) -> Self {
        if elapsed < fast {
            Self::Fast
        } else if elapsed > slow {
            Self::Slow
        } else {
            Self::Normal
        }
    }
}

/// Outcome of one model latency test.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    /// Model identifier the test ran against.
    pub model: String,
    /// Elapsed time to the first non-empty content fragment. On success with
    /// an empty stream this falls back to `total_time`; on failure it is
    /// `None`.
    pub first_token_time: Option<Duration>,
    /// Elapsed time to stream completion. `None` on failure.
    pub total_time: Option<Duration>,
    /// Whether the request completed without error.
    pub success: bool,
    /// Character count of the accumulated response text.
    pub response_length: usize,
    /// First [`PREVIEW_CHARS`] characters of the response, with a trailing
    /// `…` when truncated.
    pub preview: String,
    /// Human-readable failure description. Set exactly when `success` is
    /// false.
    pub error: Option<String>,
    /// Wall-clock time the result was created.
    pub timestamp: DateTime<Local>,
}

impl TestResult {
    /// Build a successful result from the accumulated response text.
    ///
    /// `first_token_time` falls back to `total_time` when the stream
    /// produced no content fragment at all.
    #[must_use]
    pub fn success(
        model: &str,
        first_token_time: Option<Duration>,
        total_time: Duration,
        text: &str,
    ) -> Self {
        Self {
            model: model.to_string(),
            first_token_time: Some(first_token_time.unwrap_or(total_time)),
            total_time: Some(total_time),
            success: true,
            response_length: text.chars().count(),
            preview: preview_of(text),
            error: None,
            timestamp: Local::now(),
        }
    }

    /// Build a failed result. Both timings are absent by construction.
    #[must_use]
    pub fn failure(model: &str, error: String) -> Self {
        Self {
            model: model.to_string(),
            first_token_time: None,
            total_time: None,
            success: false,
            response_length: 0,
            preview: String::new(),
            error: Some(error),
            timestamp: Local::now(),
        }
    }
}

/// Format a duration as milliseconds with two decimal places.
#[must_use]
pub fn format_ms(elapsed: Duration) -> String {
    format!("{:.2}", elapsed.as_secs_f64() * 1000.0)
}

fn preview_of(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }
    preview
}
