//! Configuration for tokmeter.
//!
//! Defaults target the Volcano Engine Ark chat-completion API the tool was
//! written against; everything can be overridden by pointing the
//! `TOKMETER_CONFIG` environment variable at a JSON file.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Chat-completion endpoint URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Models-listing endpoint URL
    #[serde(default = "default_models_url")]
    pub models_url: String,

    /// Connect timeout for HTTP requests, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Overall timeout for one request (including the streamed body), in
    /// seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Sampling temperature sent with every request
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion length cap sent with every request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Poll interval in milliseconds for the TUI event loop
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Model identifiers the checklist is seeded with
    #[serde(default = "default_models")]
    pub default_models: Vec<String>,
}

fn default_base_url() -> String {
    "https://ark.cn-beijing.volces.com/api/v3/chat/completions".to_string()
}

fn default_models_url() -> String {
    "https://ark.cn-beijing.volces.com/api/v3/models".to_string()
}

const fn default_connect_timeout() -> u64 {
    10
}

const fn default_request_timeout() -> u64 {
    60
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_max_tokens() -> u32 {
    1024
}

const fn default_poll_interval() -> u64 {
    100
}

fn default_models() -> Vec<String> {
    [
        "doubao-seed-1-6-250615",
        "doubao-seed-1-6-flash-250615",
        "doubao-seed-1-6-thinking-250615",
        "doubao-1-5-pro-32k-250115",
        "doubao-1-5-pro-256k-250115",
        "doubao-1-5-lite-32k-250115",
        "doubao-1-5-thinking-pro-250415",
        "doubao-1-5-vision-pro-250328",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            models_url: default_models_url(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            poll_interval_ms: default_poll_interval(),
            default_models: default_models(),
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults.
    ///
    /// Reads the JSON file named by the `TOKMETER_CONFIG` environment
    /// variable when set. A missing or unparseable file is logged and
    /// ignored rather than treated as fatal.
    #[must_use]
    pub fn load() -> Self {
        let Ok(path) = std::env::var("TOKMETER_CONFIG") else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    debug!("Loaded config from {path}");
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file {path}: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {path}: {e}");
                Self::default()
            }
        }
    }
}
