//! Telegram client errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Bot API error: {0}")]
    Api(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("File {0} has no download path")]
    MissingPath(String),
    #[error("Downloaded file is empty")]
    EmptyPayload,
}

impl TelegramError {
    /// Telegram rejected the text's Markdown/HTML markup
    pub fn is_entity_parse_error(&self) -> bool {
        matches!(self, TelegramError::Api(description) if description.contains("can't parse entities"))
    }
}
