use anyhow::Result;
use hooty_core::init_tracing;
use teloxide::prelude::*;
use tracing::{info, instrument, warn};

use crate::components::{build_bot_components, build_handler_chain};
use crate::config::BotConfig;
use crate::telegram::{run_dispatcher, UpdateContext};

/// Main entry: validate config, init logging, build components, learn the bot username,
/// then dispatch updates until a shutdown signal arrives.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.log_file)?;
    config.log_summary();

    let mode = config.update_mode()?;
    let components = build_bot_components(&config)?;

    match components.teloxide_bot.get_me().await {
        Ok(me) => {
            if let Some(username) = &me.user.username {
                *components.bot_username.write().await = Some(username.clone());
                info!(username = %username, "Bot username set");
            }
        }
        Err(e) => warn!(error = %e, "getMe failed; /hooty@<name> will match any bot name"),
    }

    let chain = build_handler_chain(&components);
    let ctx = UpdateContext::new(chain, components.bot.clone());

    info!(mode = ?mode, port = config.port, "Bot started successfully");
    run_dispatcher(components.teloxide_bot.clone(), ctx, mode, config.port).await
}
