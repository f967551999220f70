//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use anyhow::{Context, Result};
use handler_chain::HandlerChain;
use hooty_handlers::{DispatchGuard, HootyHandler, InMemoryDispatchGuard, LoggingHandler};
use image_generation_client::{ImageGenerationClient, ImageGenerator, ImageJobPoller, ReplicateClient};
use reqwest::Url;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::BotConfig;
use crate::telegram::TelegramBotAdapter;

/// Everything the handlers and the dispatcher need; produced by [`build_bot_components`].
#[derive(Clone)]
pub struct BotComponents {
    pub teloxide_bot: teloxide::Bot,
    /// Transport used by handlers for replies.
    pub bot: Arc<dyn hooty_core::Bot>,
    /// Filled from getMe at startup; `/hooty@<name>` is matched against it.
    pub bot_username: Arc<RwLock<Option<String>>>,
    pub guard: Arc<dyn DispatchGuard>,
    pub generator: Arc<dyn ImageGenerator>,
}

/// Builds the Telegram client, the dispatch guard and the Replicate image client from config.
#[instrument(skip(config))]
pub fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let mut teloxide_bot = teloxide::Bot::new(config.telegram_bot_token.clone());
    if let Some(ref url_str) = config.telegram_api_url {
        let url = Url::parse(url_str)
            .with_context(|| format!("Invalid TELEGRAM_API_URL: {}", url_str))?;
        info!(url = %url, "Using custom Telegram API URL");
        teloxide_bot = teloxide_bot.set_api_url(url);
    }

    let bot: Arc<dyn hooty_core::Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));

    let mut replicate = ReplicateClient::new(config.replicate_api_token.clone());
    if let Some(ref base_url) = config.replicate_api_url {
        replicate = replicate.with_base_url(base_url.clone());
    }
    if let Some(ref version) = config.replicate_model_version {
        replicate = replicate.with_model_version(version.clone());
    }
    info!(
        base_url = %replicate.base_url(),
        model_version = %replicate.model_version(),
        "Replicate client ready"
    );
    let generator: ImageGenerationClient = ImageJobPoller::new(replicate);

    Ok(BotComponents {
        teloxide_bot,
        bot,
        bot_username: Arc::new(RwLock::new(None)),
        guard: Arc::new(InMemoryDispatchGuard::new()),
        generator: Arc::new(generator),
    })
}

/// Handler chain: logging first, then the `/hooty` command.
pub fn build_handler_chain(components: &BotComponents) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(HootyHandler::new(
            components.bot_username.clone(),
            components.guard.clone(),
            components.generator.clone(),
            components.bot.clone(),
        )))
}
