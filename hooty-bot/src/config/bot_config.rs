//! BotConfig: Telegram and Replicate credentials, HTTP port, optional webhook domain, log file.

use anyhow::{Context, Result};
use image_generation_client::mask_token;
use reqwest::Url;
use std::env;
use tracing::info;

/// Port for the health endpoint (and the webhook receiver in webhook mode).
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_FILE: &str = "logs/hooty-bot.log";
/// Path Telegram posts updates to in webhook mode.
pub const WEBHOOK_PATH: &str = "/webhook";

/// How updates reach the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateMode {
    /// Long polling `getUpdates`.
    Polling,
    /// Telegram pushes updates to `url`, served on the health port.
    Webhook { url: Url },
}

/// Full bot config. Use [`BotConfig::load`] then [`BotConfig::validate`].
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// TELEGRAM_BOT_TOKEN
    pub telegram_bot_token: String,
    /// REPLICATE_API_TOKEN
    pub replicate_api_token: String,
    /// PORT
    pub port: u16,
    /// DOMAIN; enables webhook mode when set
    pub domain: Option<String>,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// REPLICATE_API_URL
    pub replicate_api_url: Option<String>,
    /// REPLICATE_MODEL_VERSION
    pub replicate_model_version: Option<String>,
    /// LOG_FILE
    pub log_file: String,
}

/// Reads a variable, treating unset and blank the same.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl BotConfig {
    /// Loads from environment variables. `token` overrides TELEGRAM_BOT_TOKEN if provided.
    ///
    /// Fails when either required secret is missing, naming every missing variable.
    pub fn load(token: Option<String>) -> Result<Self> {
        let telegram_bot_token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| non_empty_var("TELEGRAM_BOT_TOKEN"));
        let replicate_api_token = non_empty_var("REPLICATE_API_TOKEN");

        let (telegram_bot_token, replicate_api_token) =
            match (telegram_bot_token, replicate_api_token) {
                (Some(t), Some(r)) => (t, r),
                (t, r) => {
                    let missing: Vec<&str> = [
                        t.is_none().then_some("TELEGRAM_BOT_TOKEN"),
                        r.is_none().then_some("REPLICATE_API_TOKEN"),
                    ]
                    .into_iter()
                    .flatten()
                    .collect();
                    anyhow::bail!(
                        "Missing required environment variables: {}. Check TELEGRAM_BOT_TOKEN and REPLICATE_API_TOKEN.",
                        missing.join(", ")
                    );
                }
            };

        let port = match non_empty_var("PORT") {
            Some(p) => p
                .parse()
                .with_context(|| format!("PORT must be a number between 0 and 65535, got {:?}", p))?,
            None => DEFAULT_PORT,
        };

        let domain = non_empty_var("DOMAIN").map(|d| normalize_domain(&d));
        let telegram_api_url =
            non_empty_var("TELEGRAM_API_URL").or_else(|| non_empty_var("TELOXIDE_API_URL"));
        let replicate_api_url = non_empty_var("REPLICATE_API_URL");
        let replicate_model_version = non_empty_var("REPLICATE_MODEL_VERSION");
        let log_file = non_empty_var("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

        Ok(Self {
            telegram_bot_token,
            replicate_api_token,
            port,
            domain,
            telegram_api_url,
            replicate_api_url,
            replicate_model_version,
            log_file,
        })
    }

    /// Validates URLs derived from config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram_api_url {
            if Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if let Some(ref url_str) = self.replicate_api_url {
            if Url::parse(url_str).is_err() {
                anyhow::bail!("REPLICATE_API_URL is set but not a valid URL: {}", url_str);
            }
        }
        self.update_mode()?;
        Ok(())
    }

    /// Webhook mode when DOMAIN is set, long polling otherwise.
    pub fn update_mode(&self) -> Result<UpdateMode> {
        match self.domain {
            Some(ref domain) => {
                let url = Url::parse(&format!("https://{}{}", domain, WEBHOOK_PATH))
                    .with_context(|| format!("DOMAIN is not a valid host name: {}", domain))?;
                Ok(UpdateMode::Webhook { url })
            }
            None => Ok(UpdateMode::Polling),
        }
    }

    /// Logs the effective configuration with secrets masked.
    pub fn log_summary(&self) {
        info!(
            telegram_bot_token = %mask_token(&self.telegram_bot_token),
            replicate_api_token = %mask_token(&self.replicate_api_token),
            port = self.port,
            domain = ?self.domain,
            telegram_api_url = ?self.telegram_api_url,
            replicate_api_url = ?self.replicate_api_url,
            replicate_model_version = ?self.replicate_model_version,
            log_file = %self.log_file,
            "Configuration loaded"
        );
    }
}

/// Accepts `example.com`, `https://example.com/` and similar; returns the bare host part.
fn normalize_domain(domain: &str) -> String {
    domain
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}
