//! Telegram Bot API client

use super::types::{ApiResponse, File, FileLocation, SendMessage, Update};
use super::TelegramError;
use crate::runtime::{ChatPlatform, UpdateFeed};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

const METHOD_GET_FILE: &str = "getFile";
const METHOD_GET_UPDATES: &str = "getUpdates";
const METHOD_SEND_MESSAGE: &str = "sendMessage";
const METHOD_SET_WEBHOOK: &str = "setWebhook";
const METHOD_DELETE_WEBHOOK: &str = "deleteWebhook";

/// Parse modes accepted by `sendMessage`
pub const FORMAT_MARKDOWN: &str = "Markdown";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for one bot token
pub struct TelegramClient {
    client: Client,
    token: String,
    base_url: String,
    parse_mode: Option<String>,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Result<Self, TelegramError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            token: token.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            parse_mode: Some(FORMAT_MARKDOWN.to_string()),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `None` sends replies as plain text
    #[must_use]
    pub fn with_parse_mode(mut self, parse_mode: Option<String>) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token)
    }

    fn file_url(&self, path: &str) -> String {
        format!(
            "{}/file/bot{}/{}",
            self.base_url,
            self.token,
            path.trim_start_matches('/')
        )
    }

    /// POST a JSON body to a Bot API method and unwrap the envelope
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!(method, "Telegram API call");

        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(TelegramError::Decode(format!("{e} - body: {text}")));
            }
            Err(_) => {
                return Err(TelegramError::Status {
                    status: status.as_u16(),
                    body: text,
                });
            }
        };

        if !envelope.ok {
            tracing::debug!(method, error_code = ?envelope.error_code, "Bot API call rejected");
            let description = envelope
                .description
                .unwrap_or_else(|| format!("{method} failed with HTTP {status}"));
            return Err(TelegramError::Api(description));
        }

        envelope
            .result
            .ok_or_else(|| TelegramError::Decode(format!("{method} returned no result")))
    }

    /// Register `url` as the webhook receiving updates
    pub async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        let _: bool = self
            .call(METHOD_SET_WEBHOOK, &serde_json::json!({ "url": url }))
            .await?;
        tracing::info!(url, "Webhook registered");
        Ok(())
    }

    /// Remove any webhook so `getUpdates` can be used
    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        let _: bool = self
            .call(METHOD_DELETE_WEBHOOK, &serde_json::json!({}))
            .await?;
        tracing::info!("Webhook removed");
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for TelegramClient {
    async fn fetch_file_location(&self, file_id: &str) -> Result<FileLocation, TelegramError> {
        let file: File = self
            .call(METHOD_GET_FILE, &serde_json::json!({ "file_id": file_id }))
            .await?;

        let path = file
            .file_path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| TelegramError::MissingPath(file_id.to_string()))?;

        tracing::debug!(file_id, path = %path, "Resolved file location");

        Ok(FileLocation {
            file_id: file.file_id,
            path,
        })
    }

    async fn download_file(&self, location: &FileLocation) -> Result<Vec<u8>, TelegramError> {
        let response = self.client.get(self.file_url(&location.path)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelegramError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(TelegramError::EmptyPayload);
        }

        tracing::debug!(path = %location.path, size = bytes.len(), "File downloaded");
        Ok(bytes.to_vec())
    }

    /// Sends with the configured parse mode, falling back to plain text when
    /// Telegram cannot parse the markup (unbalanced `_` or `*` in a reply).
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: self.parse_mode.as_deref(),
        };
        match self.call::<_, serde_json::Value>(METHOD_SEND_MESSAGE, &body).await {
            Ok(_) => Ok(()),
            Err(e) if body.parse_mode.is_some() && e.is_entity_parse_error() => {
                tracing::warn!(error = %e, "Markup rejected, resending as plain text");
                let plain = SendMessage {
                    parse_mode: None,
                    ..body
                };
                let _: serde_json::Value = self.call(METHOD_SEND_MESSAGE, &plain).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl UpdateFeed for TelegramClient {
    async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        self.call(METHOD_GET_UPDATES, &body).await
    }
}
