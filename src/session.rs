//! Conversation session
//!
//! The single in-memory conversational context shared across turns. The
//! session is either `Empty` (no history) or `Active` (seeded with the
//! configured system messages and accepting turns).


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A role-tagged message in the session history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No history, before the first start or after an end
    Empty,
    /// History seeded, accepting turns
    Active,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session is not active")]
    NotActive,
    #[error("refusing to store an empty {0:?} message")]
    EmptyContent(Role),
}

/// The process-wide conversation
#[derive(Debug)]
pub struct ConversationSession {
    id: Option<String>,
    history: Vec<ChatMessage>,
    model: String,
    started_at: Option<DateTime<Utc>>,
    state: SessionState,
    seed: Vec<ChatMessage>,
}

impl ConversationSession {
    /// Create an `Empty` session. `seed` holds the system prompts that every
    /// `start()` installs; blank prompts are skipped.
    pub fn new(model: impl Into<String>, seed: impl IntoIterator<Item = String>) -> Self {
        Self {
            id: None,
            history: Vec::new(),
            model: model.into(),
            started_at: None,
            state: SessionState::Empty,
            seed: seed
                .into_iter()
                .filter(|prompt| !prompt.trim().is_empty())
                .map(ChatMessage::system)
                .collect(),
        }
    }

    /// Discard any prior history and reseed. Valid from both states.
    pub fn start(&mut self) {
        self.id = Some(uuid::Uuid::new_v4().to_string());
        self.started_at = Some(Utc::now());
        self.history.clear();
        self.history.extend(self.seed.iter().cloned());
        self.state = SessionState::Active;
    }

    /// Discard history and return to `Empty`.
    pub fn end(&mut self) {
        self.history.clear();
        self.id = None;
        self.state = SessionState::Empty;
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) -> Result<(), SessionError> {
        self.append(ChatMessage::user(content))
    }

    pub fn add_bot_message(&mut self, content: impl Into<String>) -> Result<(), SessionError> {
        self.append(ChatMessage::assistant(content))
    }

    fn append(&mut self, message: ChatMessage) -> Result<(), SessionError> {
        if self.state != SessionState::Active {
            return Err(SessionError::NotActive);
        }
        if message.content.is_empty() {
            return Err(SessionError::EmptyContent(message.role));
        }
        self.history.push(message);
        Ok(())
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Correlation id of the current session, `None` while `Empty`
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn seed_len(&self) -> usize {
        self.seed.len()
    }
}
