//! Wraps teloxide::Bot and implements [`hooty_core::Bot`]. Production code sends via Telegram; tests can substitute another Bot impl.

use async_trait::async_trait;
use hooty_core::{Bot as CoreBot, Chat, HootyError, Result};
use reqwest::Url;
use teloxide::payloads::SendPhotoSetters;
use teloxide::{prelude::*, types::ChatId, types::InputFile};

/// Thin wrapper around teloxide::Bot that implements core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(|e| HootyError::Bot(e.to_string()))?;
        Ok(())
    }

    /// Telegram downloads the photo from `image_url` itself.
    async fn send_photo(&self, chat: &Chat, image_url: &str, caption: Option<&str>) -> Result<()> {
        let url = Url::parse(image_url)
            .map_err(|e| HootyError::Bot(format!("Invalid image url {}: {}", image_url, e)))?;
        let request = self.bot.send_photo(ChatId(chat.id), InputFile::url(url));
        let request = match caption {
            Some(c) => request.caption(c.to_string()),
            None => request,
        };
        request.await.map_err(|e| HootyError::Bot(e.to_string()))?;
        Ok(())
    }
}
