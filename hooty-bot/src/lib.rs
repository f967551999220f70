//! # Hooty bot application
//!
//! Wires hooty-handlers and the Replicate image client into a teloxide dispatcher.
//! Loads config from env, serves a health route and receives updates by long polling or webhook.

pub mod cli;
pub mod components;
pub mod config;
pub mod health;
pub mod runner;
pub mod telegram;

pub use cli::{load_config, Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, BotComponents};
pub use config::{BotConfig, UpdateMode};
pub use runner::run_bot;
pub use telegram::{
    handle_core_message, run_dispatcher, shutdown_signal, TelegramBotAdapter,
    TelegramMessageWrapper, TelegramUserWrapper, UpdateContext,
};
