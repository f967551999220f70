//! `/hooty <prompt>` handler: dedup, progress reply, image generation, photo reply.

use async_trait::async_trait;
use hooty_core::{Bot, Handler, HandlerResponse, Message, Result};
use image_generation_client::ImageGenerator;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use crate::dispatch_guard::{DedupKey, DispatchGuard};

/// Command that triggers image generation.
pub const COMMAND: &str = "/hooty";
/// Prepended to every user prompt.
pub const PROMPT_PREFIX: &str = "hoooty";

pub const MSG_USAGE: &str = "Please provide a prompt, e.g., /hooty flying over a city";
pub const MSG_GENERATING: &str = "Generating your Hoooty image... 🦉✨";
pub const MSG_GENERATION_FAILED: &str = "Something went wrong generating the image.";

/// Returns the prompt (trimmed, possibly empty) when `text` is a `/hooty` command.
///
/// Accepts `/hooty` and `/hooty@<bot_username>` (username compared case-insensitively; any
/// username is accepted while the bot's own is still unknown). `/hootyfoo` is not the command.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<String> {
    let text = text.trim_start();
    let (head, rest) = match text.find(char::is_whitespace) {
        Some(i) => text.split_at(i),
        None => (text, ""),
    };

    let name = head.strip_prefix(COMMAND)?;
    if !name.is_empty() {
        let target = name.strip_prefix('@')?;
        if let Some(username) = bot_username {
            if !target.eq_ignore_ascii_case(username) {
                return None;
            }
        }
    }

    Some(rest.trim().to_string())
}

/// Handles `/hooty` commands; other messages pass through with Continue.
///
/// Each admitted command sends a progress message, runs one generation job and replies with
/// the photo or a single generic failure text. Duplicates are dropped without a reply.
#[derive(Clone)]
pub struct HootyHandler {
    bot_username: Arc<RwLock<Option<String>>>,
    guard: Arc<dyn DispatchGuard>,
    generator: Arc<dyn ImageGenerator>,
    bot: Arc<dyn Bot>,
}

impl HootyHandler {
    pub fn new(
        bot_username: Arc<RwLock<Option<String>>>,
        guard: Arc<dyn DispatchGuard>,
        generator: Arc<dyn ImageGenerator>,
        bot: Arc<dyn Bot>,
    ) -> Self {
        Self {
            bot_username,
            guard,
            generator,
            bot,
        }
    }

    async fn generate_and_reply(&self, message: &Message, prompt: &str) {
        self.send_or_log(message, MSG_GENERATING).await;

        let full_prompt = format!("{} {}", PROMPT_PREFIX, prompt);
        let image_url = match self.generator.generate(&full_prompt).await {
            Ok(url) => url,
            Err(e) => {
                error!(
                    chat_id = message.chat.id,
                    message_id = %message.id,
                    error = %e,
                    "Image generation error"
                );
                self.send_or_log(message, MSG_GENERATION_FAILED).await;
                return;
            }
        };

        if let Err(e) = self.bot.send_photo(&message.chat, &image_url, None).await {
            error!(chat_id = message.chat.id, error = %e, "Failed to send photo");
            self.send_or_log(message, MSG_GENERATION_FAILED).await;
            return;
        }

        info!(
            chat_id = message.chat.id,
            message_id = %message.id,
            image_url = %image_url,
            "Image generated and sent"
        );
    }

    async fn send_or_log(&self, message: &Message, text: &str) {
        if let Err(e) = self.bot.reply_to(message, text).await {
            error!(chat_id = message.chat.id, error = %e, "Failed to send message");
        }
    }
}

#[async_trait]
impl Handler for HootyHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id, message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let bot_username = self.bot_username.read().await.clone();
        let prompt = match parse_command(&message.content, bot_username.as_deref()) {
            Some(p) => p,
            None => return Ok(HandlerResponse::Continue),
        };

        let key = DedupKey::from(message);
        if !self.guard.admit(&key).await {
            debug!(key = %key, "Duplicate command dropped");
            return Ok(HandlerResponse::Stop);
        }

        if prompt.is_empty() {
            return Ok(HandlerResponse::Reply(MSG_USAGE.to_string()));
        }

        info!(
            user_id = message.user.id,
            prompt_preview = %prompt.chars().take(50).collect::<String>(),
            "Processing /hooty command"
        );
        self.generate_and_reply(message, &prompt).await;

        Ok(HandlerResponse::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_plain() {
        assert_eq!(
            parse_command("/hooty flying over a city", None).as_deref(),
            Some("flying over a city")
        );
        assert_eq!(
            parse_command("  /hooty   owl in space  ", None).as_deref(),
            Some("owl in space")
        );
        assert_eq!(parse_command("/hooty\nmultiline prompt", None).as_deref(), Some("multiline prompt"));
    }

    #[test]
    fn test_parse_command_empty_prompt() {
        assert_eq!(parse_command("/hooty", None).as_deref(), Some(""));
        assert_eq!(parse_command("/hooty   ", None).as_deref(), Some(""));
    }

    #[test]
    fn test_parse_command_with_username() {
        assert_eq!(
            parse_command("/hooty@HootyBot owl", Some("hootybot")).as_deref(),
            Some("owl")
        );
        assert_eq!(parse_command("/hooty@otherbot owl", Some("hootybot")), None);
        assert_eq!(
            parse_command("/hooty@anybot owl", None).as_deref(),
            Some("owl")
        );
        assert_eq!(parse_command("/hooty@ owl", Some("hootybot")), None);
    }

    #[test]
    fn test_parse_command_rejects_other_text() {
        assert_eq!(parse_command("hello", None), None);
        assert_eq!(parse_command("/hootyfoo owl", None), None);
        assert_eq!(parse_command("/start", None), None);
        assert_eq!(parse_command("please /hooty owl", None), None);
        assert_eq!(parse_command("", None), None);
    }
}
