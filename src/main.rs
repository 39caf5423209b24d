//! Tokmeter - terminal latency meter for LLM chat-completion endpoints

use anyhow::Result;
use clap::Parser;
use tokmeter::{App, Config};

/// Terminal latency meter for LLM chat-completion endpoints
#[derive(Debug, Parser)]
#[command(name = "tokmeter")]
#[command(version, about, long_about = None)]
struct Cli {}

fn main() -> Result<()> {
    let Cli {} = Cli::parse();

    // Log to /tmp/tokmeter.log - tail with: tail -f /tmp/tokmeter.log
    // Set DEBUG=0-3 to control verbosity (0=off, 1=warn, 2=info, 3=debug)
    let debug_level = std::env::var("DEBUG")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(0);

    if debug_level > 0 {
        if let Err(e) = std::fs::write("/tmp/tokmeter.log", "") {
            eprintln!("Warning: Failed to clear log file: {e}");
        }

        let level = match debug_level {
            1 => tracing::Level::WARN,
            2 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        };

        let file_appender = tracing_appender::rolling::never("/tmp", "tokmeter.log");
        tracing_subscriber::fmt()
            .with_writer(file_appender)
            .with_max_level(level)
            .with_ansi(false)
            .init();
    }

    let config = Config::load();
    let app = App::new(config);
    tokmeter::tui::run(app)
}
