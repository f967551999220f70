//! Telegram layer: adapters, Bot implementation, update dispatching (polling or webhook).

mod adapters;
mod bot_adapter;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use runner::{handle_core_message, run_dispatcher, shutdown_signal, UpdateContext};
