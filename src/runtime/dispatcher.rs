//! Update dispatcher
//!
//! Drives one turn per inbound update: command handling, voice resolution,
//! session bookkeeping, completion and reply. The session lock is held from
//! the moment an update passes validation until the turn returns, so turns
//! are applied to the history one at a time and in arrival order.

use super::policy::ErrorPolicy;
use super::traits::{AudioTranscoder, ChatPlatform, CompletionProvider};
use crate::command::{self, Command};
use crate::session::{ChatMessage, ConversationSession};
use crate::telegram::{Message, Update};
use crate::voice::{VoiceError, VoiceRef, VoiceResolver};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::Instrument;

/// Behavior knobs for the dispatcher
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Completion model requested for every turn
    pub model: String,
    /// System messages seeded by every session start
    pub system_prompts: Vec<String>,
    /// Drop ordinary messages until `/start` has been received
    pub require_explicit_start: bool,
    /// Reply sent after `/end`
    pub end_notice: String,
    /// Accepted voice container mime type
    pub voice_mime: String,
    pub error_policy: ErrorPolicy,
}

/// Why a turn failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("invalid update: {0}")]
    Validation(String),
    #[error("unsupported voice format: {0}")]
    UnsupportedFormat(String),
    #[error("voice fetch failed: {0}")]
    FetchFailed(String),
    #[error("voice transcode failed: {0}")]
    TranscodeFailed(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("completion failed: {0}")]
    CompletionFailed(String),
    #[error("sending reply failed: {0}")]
    SendFailed(String),
}

impl From<VoiceError> for TurnError {
    fn from(error: VoiceError) -> Self {
        match error {
            VoiceError::UnsupportedFormat(mime) => {
                TurnError::UnsupportedFormat(mime.unwrap_or_else(|| "<none>".to_string()))
            }
            VoiceError::FetchFailed(e) => TurnError::FetchFailed(e.to_string()),
            VoiceError::TranscodeFailed(e) => TurnError::TranscodeFailed(e.to_string()),
            VoiceError::TranscriptionFailed(e) => TurnError::TranscriptionFailed(e.to_string()),
        }
    }
}

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A completion was generated and sent
    Replied,
    /// A fixed notice was sent instead of a completion
    AbortedWithNotice,
    /// Nothing was sent
    AbortedSilently(AbortReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// `/start` consumed the turn
    SessionStarted,
    UnknownCommand(String),
    /// Explicit start required and the session is empty
    NotStarted,
    EmptyContent,
    Failed(TurnError),
}

/// Processes updates against the single shared session
pub struct Dispatcher<P, C, T> {
    platform: P,
    provider: C,
    transcoder: T,
    session: Arc<Mutex<ConversationSession>>,
    config: DispatchConfig,
}

impl<P, C, T> Dispatcher<P, C, T>
where
    P: ChatPlatform,
    C: CompletionProvider,
    T: AudioTranscoder,
{
    pub fn new(platform: P, provider: C, transcoder: T, config: DispatchConfig) -> Self {
        let session = ConversationSession::new(config.model.clone(), config.system_prompts.clone());
        Self {
            platform,
            provider,
            transcoder,
            session: Arc::new(Mutex::new(session)),
            config,
        }
    }

    pub fn session(&self) -> &Arc<Mutex<ConversationSession>> {
        &self.session
    }

    /// Run one turn to completion. Never fails: every error is logged and
    /// folded into the outcome.
    pub async fn handle(&self, update: Update) -> TurnOutcome {
        let update_id = update.id;
        let (message, chat_id) = match validate(update) {
            Ok(valid) => valid,
            Err(error) => {
                tracing::info!(update_id, error = %error, "Dropping update");
                return TurnOutcome::AbortedSilently(AbortReason::Failed(error));
            }
        };

        let span = tracing::info_span!("turn", update_id, chat_id);
        async move {
            let mut session = self.session.lock().await;
            match self.run_turn(&mut session, &message, chat_id).await {
                Ok(outcome) => {
                    tracing::debug!(?outcome, history = session.history().len(), "Turn finished");
                    outcome
                }
                Err(error) => self.report_failure(chat_id, error).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn run_turn(
        &self,
        session: &mut ConversationSession,
        message: &Message,
        chat_id: i64,
    ) -> Result<TurnOutcome, TurnError> {
        match command::classify(&message.entities, message.text()) {
            Command::Start => {
                session.start();
                tracing::info!(session_id = ?session.id(), "Session started");
                return Ok(TurnOutcome::AbortedSilently(AbortReason::SessionStarted));
            }
            Command::End => {
                let ended = session.id().map(str::to_string);
                session.end();
                tracing::info!(session_id = ?ended, "Session ended");
                self.send(chat_id, &self.config.end_notice).await?;
                return Ok(TurnOutcome::AbortedWithNotice);
            }
            Command::Unknown(literal) => {
                tracing::info!(command = %literal, "Ignoring unknown command");
                return Ok(TurnOutcome::AbortedSilently(AbortReason::UnknownCommand(literal)));
            }
            Command::NotACommand => {}
        }

        if self.config.require_explicit_start && !session.is_active() {
            tracing::info!("No active session and explicit /start required");
            return Ok(TurnOutcome::AbortedSilently(AbortReason::NotStarted));
        }

        let text = self.resolve_content(message).await?;
        if text.trim().is_empty() {
            tracing::info!("Empty content, nothing to answer");
            return Ok(TurnOutcome::AbortedSilently(AbortReason::EmptyContent));
        }

        if !session.is_active() {
            session.start();
            tracing::info!(session_id = ?session.id(), "Session started implicitly");
        }

        // History is only committed once the completion succeeded
        let mut context = session.history().to_vec();
        context.push(ChatMessage::user(text.clone()));

        let completion = self
            .provider
            .create_completion(session.model(), &context)
            .await
            .map_err(|e| TurnError::CompletionFailed(e.to_string()))?;

        let reply = completion
            .first_content()
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| TurnError::CompletionFailed("completion had no content".to_string()))?
            .to_string();

        session
            .add_user_message(text)
            .and_then(|()| session.add_bot_message(reply.clone()))
            .map_err(|e| TurnError::Validation(e.to_string()))?;

        self.send(chat_id, &reply).await?;
        tracing::info!(history = session.history().len(), "Reply sent");
        Ok(TurnOutcome::Replied)
    }

    async fn resolve_content(&self, message: &Message) -> Result<String, TurnError> {
        let Some(voice) = &message.voice else {
            return Ok(message.text().to_string());
        };

        tracing::debug!(file_id = %voice.file_id, "Resolving voice message");
        let resolver = VoiceResolver::new(
            &self.platform,
            &self.transcoder,
            &self.provider,
            &self.config.voice_mime,
        );
        let text = resolver.resolve(&VoiceRef::from(voice)).await?;
        tracing::info!(chars = text.chars().count(), "Voice transcribed");
        Ok(text)
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TurnError> {
        self.platform
            .send_message(chat_id, text)
            .await
            .map_err(|e| TurnError::SendFailed(e.to_string()))
    }

    async fn report_failure(&self, chat_id: i64, error: TurnError) -> TurnOutcome {
        if matches!(error, TurnError::SendFailed(_)) {
            tracing::error!(error = %error, "Reply lost");
        } else {
            tracing::warn!(error = %error, "Turn aborted");
        }

        if let Some(notice) = self.config.error_policy.notice_for(&error) {
            match self.platform.send_message(chat_id, notice).await {
                Ok(()) => return TurnOutcome::AbortedWithNotice,
                Err(e) => tracing::error!(error = %e, "Failed to send error notice"),
            }
        }

        TurnOutcome::AbortedSilently(AbortReason::Failed(error))
    }
}

/// Check that an update can be processed, returning its message and chat id
fn validate(update: Update) -> Result<(Message, i64), TurnError> {
    if update.id == 0 {
        return Err(TurnError::Validation("update id is zero".to_string()));
    }
    let message = update
        .message
        .ok_or_else(|| TurnError::Validation("update has no message".to_string()))?;
    if message.sent_by_bot() {
        return Err(TurnError::Validation("message sent by a bot".to_string()));
    }
    let chat_id = message
        .chat
        .as_ref()
        .map(|chat| chat.id)
        .ok_or_else(|| TurnError::Validation("message has no chat".to_string()))?;
    Ok((message, chat_id))
}
