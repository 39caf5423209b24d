//! Application state and logic

mod event;
mod handlers;
mod input;
mod models;
mod state;

pub use event::{Event, Handler};
pub use handlers::Actions;
pub use input::InputState;
pub use models::{ModelEntry, ModelList};
pub use state::{App, Field, Focus, Mode, RunState};
