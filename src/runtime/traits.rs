//! Trait abstractions for the dispatcher's collaborators
//!
//! The dispatcher only talks to the outside world through these traits, so
//! tests can drive it with the mocks in `testing.rs`.

use crate::audio::{TargetSpec, TranscodeError};
use crate::llm::{Completion, LlmError, Transcription};
use crate::session::ChatMessage;
use crate::telegram::{FileLocation, TelegramError, Update};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Chat platform operations used by a turn
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Resolve a file id into a download location
    async fn fetch_file_location(&self, file_id: &str) -> Result<FileLocation, TelegramError>;

    /// Download the raw bytes behind a location
    async fn download_file(&self, location: &FileLocation) -> Result<Vec<u8>, TelegramError>;

    /// Send a text message to a chat
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;
}

/// Source of updates for long-polling mode
#[async_trait]
pub trait UpdateFeed: Send + Sync {
    async fn get_updates(&self, offset: i64, timeout: Duration)
        -> Result<Vec<Update>, TelegramError>;
}

/// Completion and transcription calls against the model provider
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn create_completion(
        &self,
        model: &str,
        history: &[ChatMessage],
    ) -> Result<Completion, LlmError>;

    async fn transcribe(&self, audio: Vec<u8>) -> Result<Transcription, LlmError>;
}

/// External audio encoder
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Convert `input` (in container `source_format`) to the target spec
    async fn transcode(
        &self,
        input: &[u8],
        source_format: &str,
        target: &TargetSpec,
    ) -> Result<Vec<u8>, TranscodeError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: ChatPlatform + ?Sized> ChatPlatform for Arc<T> {
    async fn fetch_file_location(&self, file_id: &str) -> Result<FileLocation, TelegramError> {
        (**self).fetch_file_location(file_id).await
    }

    async fn download_file(&self, location: &FileLocation) -> Result<Vec<u8>, TelegramError> {
        (**self).download_file(location).await
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        (**self).send_message(chat_id, text).await
    }
}

#[async_trait]
impl<T: UpdateFeed + ?Sized> UpdateFeed for Arc<T> {
    async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        (**self).get_updates(offset, timeout).await
    }
}

#[async_trait]
impl<T: CompletionProvider + ?Sized> CompletionProvider for Arc<T> {
    async fn create_completion(
        &self,
        model: &str,
        history: &[ChatMessage],
    ) -> Result<Completion, LlmError> {
        (**self).create_completion(model, history).await
    }

    async fn transcribe(&self, audio: Vec<u8>) -> Result<Transcription, LlmError> {
        (**self).transcribe(audio).await
    }
}

#[async_trait]
impl<T: AudioTranscoder + ?Sized> AudioTranscoder for Arc<T> {
    async fn transcode(
        &self,
        input: &[u8],
        source_format: &str,
        target: &TargetSpec,
    ) -> Result<Vec<u8>, TranscodeError> {
        (**self).transcode(input, source_format, target).await
    }
}
