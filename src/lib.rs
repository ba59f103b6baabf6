//! Terminal chat client for the CCCC.AI completion backend.
//!
//! The [`controller::ChatController`] owns the conversation and talks to the
//! server through a [`client::CompletionBackend`]; the TUI modules (`app`,
//! `handler`, `ui`, `tui`) drive it from a single event loop.

pub mod app;
pub mod client;
pub mod config;
pub mod controller;
pub mod export;
pub mod format;
pub mod handler;
pub mod input;
pub mod keymap;
pub mod logging;
pub mod session;
pub mod theme;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use client::{ChatClient, ClientError, CompletionBackend};
pub use config::Config;
pub use controller::ChatController;
pub use format::format_content;
pub use session::{Message, Role, SessionState};
pub use theme::{FileThemeStore, MemoryThemeStore, Theme, ThemeStore};
