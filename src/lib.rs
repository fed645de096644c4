#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_match)]
#![allow(clippy::collapsible_else_if)]

pub mod config;
pub mod core;
pub mod errors;
pub mod logging;
pub mod services;
pub mod tui;

// Re-export commonly used types
pub use config::Config;
pub use core::{FilterId, Notification, TableDataset, TableViewState};
pub use services::{FilterOrchestrator, ServerClient};
pub use tui::{Action, ActionCategory, App};
