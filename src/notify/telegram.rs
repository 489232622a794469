use crate::config::{mask_secret, TelegramConfig};
use crate::image::ImageLoader;
use crate::utils::error::ServiceError;
use crate::Result;
use image::RgbImage;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const CAPTION_FOUND: &str = "✅ Человек обнаружен на изображении";
pub const CAPTION_NOT_FOUND: &str = "❌ Человек не обнаружен на изображении";

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// What happened to one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Delivered as requested.
    Sent,
    /// The photo could not be sent but a text fallback got through.
    FellBack,
    /// Credentials are not configured; nothing was sent.
    Skipped,
    /// Nothing could be delivered.
    Failed(String),
}

impl Delivery {
    pub fn delivered(&self) -> bool {
        matches!(self, Delivery::Sent | Delivery::FellBack)
    }
}

#[derive(Clone)]
struct BotCredentials {
    token: String,
    chat_id: String,
}

/// Bot API envelope; only the fields needed to detect failures.
#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends detection results to one Telegram chat.
///
/// Every operation swallows its errors; callers only ever see a [`Delivery`].
pub struct TelegramNotifier {
    client: Client,
    credentials: Option<BotCredentials>,
    api_url: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        match &config.bot_token {
            Some(token) => tracing::info!("TELEGRAM_BOT_TOKEN found: {}", mask_secret(token)),
            None => tracing::error!("TELEGRAM_BOT_TOKEN is not set"),
        }
        match &config.chat_id {
            Some(chat_id) => tracing::info!("TELEGRAM_CHAT_ID found: {}", chat_id),
            None => tracing::error!("TELEGRAM_CHAT_ID is not set"),
        }

        let credentials = match (&config.bot_token, &config.chat_id) {
            (Some(token), Some(chat_id)) => Some(BotCredentials {
                token: token.clone(),
                chat_id: chat_id.clone(),
            }),
            _ => None,
        };

        if credentials.is_some() {
            tracing::info!("Telegram notifier initialized");
        }

        Self {
            client: Client::new(),
            credentials,
            api_url: config.api_url.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Sends `image` with a caption describing the verdict. Falls back to a
    /// text message when the photo cannot be encoded or sent.
    pub async fn send_result(&self, has_person: bool, image: &RgbImage, filename: Option<&str>) -> Delivery {
        let Some(credentials) = &self.credentials else {
            tracing::error!("Cannot notify Telegram: bot token or chat id is not configured");
            return Delivery::Skipped;
        };

        tracing::info!(
            "Sending detection result to Telegram: has_person={}, size={}x{}",
            has_person,
            image.width(),
            image.height()
        );

        let caption = if has_person { CAPTION_FOUND } else { CAPTION_NOT_FOUND };
        let photo_name = match filename {
            Some(name) if !name.is_empty() => format!("processed_{}", name),
            _ => "processed_image.jpg".to_string(),
        };

        let sent = match ImageLoader::encode_jpeg(image) {
            Ok(jpeg) => self.send_photo(credentials, jpeg, &photo_name, caption).await,
            Err(e) => Err(e),
        };

        let error = match sent {
            Ok(()) => {
                tracing::info!("Telegram photo sent: {}", caption);
                return Delivery::Sent;
            }
            Err(e) => e,
        };

        tracing::error!("Failed to send photo to Telegram: {}", error);

        let fallback = format!(
            "Ошибка при отправке изображения: {}\nФайл: {}\nНайден человек: {}",
            error,
            filename.unwrap_or("-"),
            has_person
        );
        match self.send_text(&fallback).await {
            Delivery::Sent => Delivery::FellBack,
            Delivery::Failed(reason) => {
                tracing::error!("Could not send even the fallback text message: {}", reason);
                Delivery::Failed(error.to_string())
            }
            other => other,
        }
    }

    /// Sends a plain text message to the configured chat.
    pub async fn send_text(&self, message: &str) -> Delivery {
        let Some(credentials) = &self.credentials else {
            tracing::error!("Cannot notify Telegram: bot token or chat id is not configured");
            return Delivery::Skipped;
        };

        tracing::info!("Sending text message to chat {}", credentials.chat_id);

        let body = json!({
            "chat_id": credentials.chat_id,
            "text": message,
        });
        let request = self
            .client
            .post(self.method_url(credentials, "sendMessage"))
            .timeout(SEND_TIMEOUT)
            .json(&body);

        match Self::execute(request).await {
            Ok(()) => {
                tracing::info!("Telegram text message sent");
                Delivery::Sent
            }
            Err(e) => {
                tracing::error!("Failed to send text message to Telegram: {}", e);
                Delivery::Failed(e.to_string())
            }
        }
    }

    async fn send_photo(
        &self,
        credentials: &BotCredentials,
        jpeg: Vec<u8>,
        photo_name: &str,
        caption: &str,
    ) -> Result<()> {
        tracing::debug!("Prepared {} ({} bytes) for chat {}", photo_name, jpeg.len(), credentials.chat_id);

        let photo = Part::bytes(jpeg)
            .file_name(photo_name.to_string())
            .mime_str("image/jpeg")?;
        let form = Form::new()
            .text("chat_id", credentials.chat_id.clone())
            .text("caption", caption.to_string())
            .part("photo", photo);

        let request = self
            .client
            .post(self.method_url(credentials, "sendPhoto"))
            .timeout(SEND_TIMEOUT)
            .multipart(form);

        Self::execute(request).await
    }

    async fn execute(request: reqwest::RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: Option<BotResponse> = serde_json::from_str(&text).ok();
        match parsed {
            Some(body) if status.is_success() && body.ok => Ok(()),
            Some(body) => Err(ServiceError::Notification(format!(
                "Bot API returned {}: {}",
                status,
                body.description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(ServiceError::Notification(format!(
                "Bot API returned {} with unexpected body: {}",
                status, text
            ))),
        }
    }

    fn method_url(&self, credentials: &BotCredentials, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, credentials.token, method)
    }
}
