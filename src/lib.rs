//! Tokmeter - terminal latency meter for LLM chat-completion endpoints
//!
//! Tokmeter issues streaming chat-completion requests against a set of
//! model identifiers, one model at a time, and measures time-to-first-token
//! and total completion time per model. Results accumulate in a table and
//! can be exported to CSV.

pub mod app;
pub mod client;
pub mod config;
pub mod export;
pub mod report;
pub mod runner;
pub mod tui;

pub use app::App;
pub use config::Config;
pub use report::{TestResult, ThinkingMode};
