//! Error types for the bot core.

use thiserror::Error;

/// Top-level error for core operations (bot transport, IO).
#[derive(Error, Debug)]
pub enum HootyError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations; uses [`HootyError`].
pub type Result<T> = std::result::Result<T, HootyError>;
