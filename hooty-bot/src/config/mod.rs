//! Bot configuration loaded from the environment (after `.env` via dotenvy).

mod bot_config;


pub use bot_config::{BotConfig, UpdateMode, DEFAULT_LOG_FILE, DEFAULT_PORT, WEBHOOK_PATH};
