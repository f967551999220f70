//! Logs each inbound message in before() and the chain's response in after(); never stops the chain.

use async_trait::async_trait;
use hooty_core::{Handler, HandlerResponse, Message, Result};
use tracing::{debug, info};

pub struct LoggingHandler;

#[async_trait]
impl Handler for LoggingHandler {
    async fn before(&self, message: &Message) -> Result<bool> {
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            message_id = %message.id,
            username = %message.user.username.as_deref().unwrap_or("unknown"),
            message_content = %message.content,
            "Received message"
        );
        Ok(true)
    }

    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        debug!(
            chat_id = message.chat.id,
            message_id = %message.id,
            response = ?response,
            "Processed message"
        );
        Ok(())
    }
}
