//! Telegram Bot API wire types
//!
//! Only the fields the relay reads or writes are modelled; unknown fields
//! are ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Entity kind Telegram uses for `/command` spans
pub const ENTITY_BOT_COMMAND: &str = "bot_command";

/// <https://core.telegram.org/bots/api#update>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Update {
    #[serde(rename = "update_id", default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// <https://core.telegram.org/bots/api#message>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "message_id", default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<Chat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<Voice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<MessageEntity>,
    #[serde(default)]
    pub date: i64,
}

impl Message {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn sent_by_bot(&self) -> bool {
        self.from.as_ref().is_some_and(|user| user.is_bot)
    }
}

/// <https://core.telegram.org/bots/api#user>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// <https://core.telegram.org/bots/api#chat>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// <https://core.telegram.org/bots/api#voice>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Voice {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

/// <https://core.telegram.org/bots/api#messageentity>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub length: usize,
}

impl MessageEntity {
    #[cfg(test)]
    pub fn bot_command(length: usize) -> Self {
        Self {
            kind: ENTITY_BOT_COMMAND.to_string(),
            offset: 0,
            length,
        }
    }

    pub fn is_command(&self) -> bool {
        self.kind == ENTITY_BOT_COMMAND
    }
}

/// <https://core.telegram.org/bots/api#file>
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// Relative download path; absent once the link has expired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Resolved download location of a file held by Telegram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    pub file_id: String,
    pub path: String,
}

/// <https://core.telegram.org/bots/api#sendmessage>
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'a str>,
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<u16>,
}
