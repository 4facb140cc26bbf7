pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod effect;
pub mod handler;
pub mod logging;
pub mod runner;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use api::{ActionOutcome, BackendClient, Suggestion};
pub use app::{Action, App};
pub use config::Config;
pub use effect::Effect;
