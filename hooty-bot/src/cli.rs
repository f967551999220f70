//! CLI parser and config loading.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::BotConfig;

#[derive(Parser)]
#[command(name = "hooty-bot")]
#[command(about = "Telegram bot that turns /hooty prompts into owl images", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (config from env; token overrides TELEGRAM_BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
}

impl Cli {
    /// The command to execute; running the bot when none is given.
    pub fn command(self) -> Commands {
        self.command.unwrap_or(Commands::Run { token: None })
    }
}

/// Load BotConfig from environment. If `token` is provided it overrides TELEGRAM_BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<BotConfig> {
    BotConfig::load(token)
}
