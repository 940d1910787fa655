//! Model provider integration
//!
//! Chat completions and audio transcription against an `OpenAI`-compatible
//! API, plus a logging wrapper around any `CompletionProvider`.

mod error;
mod openai;
mod types;

pub use error::LlmError;
pub use openai::{OpenAIService, TranscriptionOptions};
pub use types::*;

use crate::runtime::CompletionProvider;
use crate::session::ChatMessage;
use async_trait::async_trait;
use std::sync::Arc;

/// Logging wrapper for completion providers
pub struct LoggingProvider {
    inner: Arc<dyn CompletionProvider>,
}

impl LoggingProvider {
    pub fn new(inner: Arc<dyn CompletionProvider>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CompletionProvider for LoggingProvider {
    async fn create_completion(
        &self,
        model: &str,
        history: &[ChatMessage],
    ) -> Result<Completion, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.create_completion(model, history).await;
        let duration = start.elapsed();

        match &result {
            Ok(completion) => {
                tracing::info!(
                    model = %model,
                    messages = history.len(),
                    duration_ms = %duration.as_millis(),
                    input_tokens = completion.usage.input_tokens,
                    output_tokens = completion.usage.output_tokens,
                    "Completion request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %model,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    transient = e.kind.is_transient(),
                    "Completion request failed"
                );
            }
        }

        result
    }

    async fn transcribe(&self, audio: Vec<u8>) -> Result<Transcription, LlmError> {
        let size = audio.len();
        let start = std::time::Instant::now();
        let result = self.inner.transcribe(audio).await;
        let duration = start.elapsed();

        match &result {
            Ok(transcription) => {
                tracing::info!(
                    bytes = size,
                    chars = transcription.text.chars().count(),
                    duration_ms = %duration.as_millis(),
                    "Transcription completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    bytes = size,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    transient = e.kind.is_transient(),
                    "Transcription failed"
                );
            }
        }

        result
    }
}
