//! ollama-desk: front-end controller for a local Ollama chat client.
//!
//! The controller keeps an in-memory view model consistent with a backend
//! process reached over a request/response + push-event boundary:
//! - **Gateway** (`host`): versioned JSON envelopes over an in-process channel
//!   or a child process's stdin/stdout
//! - **Chat**: slash commands and model-switch phrases, then generation
//! - **Catalog**: built-in model cards, downloads and push progress
//! - **Drives**: external model storage, with force-eject fallback
//! - **Views**: home, chat, models, settings, analyzer, coder
//!
//! Decision logic (`commands`, `format`, `catalog`, `progress`, `drives`,
//! `ui::panels`) is pure; `controller` sequences backend calls and publishes
//! a `UiUpdate` after every change.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod controller;
pub mod desk_dirs;
pub mod downloads;
pub mod drives;
pub mod error;
pub mod format;
pub mod host;
pub mod pollers;
pub mod progress;
pub mod runtime_probe;
pub mod session;
pub mod status;
pub mod tools;
pub mod transcript;
pub mod ui;

pub use config::DeskConfig;
pub use controller::DeskController;
pub use error::{DeskError, Result};
pub use host::gateway::BackendGateway;
pub use ui::prompt::Prompter;
pub use ui::{UiState, UiUpdate};
