//! Color palette for the TUI
//!
//! Muted, cohesive colors; latency cells use the green/red cues the tool
//! is known for.

use ratatui::style::Color;

// UI Chrome
pub const BORDER: Color = Color::Rgb(100, 110, 130);
pub const FOCUS: Color = Color::Rgb(100, 180, 220);
pub const SURFACE_HIGHLIGHT: Color = Color::Rgb(50, 55, 70);

// Text
pub const TEXT_PRIMARY: Color = Color::Rgb(220, 220, 230);
pub const TEXT_DIM: Color = Color::Rgb(130, 135, 150);
pub const TEXT_MUTED: Color = Color::Rgb(90, 95, 110);

// Latency bands
pub const LAT_FAST: Color = Color::Rgb(120, 180, 120);
pub const LAT_SLOW: Color = Color::Rgb(200, 100, 100);

// Status
pub const STATUS_FAIL: Color = Color::Rgb(200, 100, 100);
pub const STATUS_OK: Color = Color::Rgb(120, 180, 120);

// Modals
pub const MODAL_BG: Color = Color::Rgb(25, 27, 35);
pub const MODAL_BORDER_ERROR: Color = Color::Rgb(200, 100, 100);
pub const MODAL_BORDER_INFO: Color = Color::Rgb(100, 140, 200);
pub const MODAL_BORDER_WARNING: Color = Color::Rgb(200, 160, 80);
