//! Bot abstraction for sending replies.
//!
//! [`Bot`] is transport-agnostic; the Telegram implementation lives in hooty-bot.

use crate::error::Result;
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// Abstraction for sending text and photos. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a text message to the chat the given message came from.
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }

    /// Sends a photo referenced by a public URL, with an optional caption.
    async fn send_photo(&self, chat: &Chat, image_url: &str, caption: Option<&str>) -> Result<()>;
}
