use crate::utils::error::ServiceError;
use crate::Result;
use std::net::SocketAddr;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub bind_addr: SocketAddr,

    /// Shared secret expected in the `api-key` header
    pub api_key: Option<String>,

    pub telegram: TelegramConfig,

    pub server_config: ServerConfig,
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,

    /// Destination chat for every notification
    pub chat_id: Option<String>,

    /// Bot API base URL, without the `/bot<token>` suffix
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

impl Config {
    pub fn new(
        bind_addr: &str,
        api_key: Option<String>,
        telegram: TelegramConfig,
    ) -> Result<Self> {
        let bind_addr: SocketAddr = bind_addr.parse().map_err(|e| {
            ServiceError::Config(format!("Invalid bind address {}: {}", bind_addr, e))
        })?;

        let api_key = api_key.filter(|key| !key.is_empty());
        if api_key.is_none() {
            tracing::warn!("API_KEY is not set, every upload will be rejected");
        }

        let server_config = ServerConfig {
            max_request_size: 50 * 1024 * 1024, // 50MB
        };

        Ok(Self {
            bind_addr,
            api_key,
            telegram,
            server_config,
        })
    }
}

impl TelegramConfig {
    pub fn new(bot_token: Option<String>, chat_id: Option<String>, api_url: String) -> Self {
        Self {
            bot_token: bot_token.filter(|t| !t.is_empty()),
            chat_id: chat_id.filter(|c| !c.is_empty()),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Config with neither credential set; the notifier stays silent.
    pub fn disabled() -> Self {
        Self::new(None, None, DEFAULT_TELEGRAM_API_URL.to_string())
    }
}

// Keeps the bot token out of `{:?}` output.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_deref().map(mask_secret))
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Shortens a secret to its first and last four characters.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
