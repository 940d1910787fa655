//! Voice note resolution: fetch, transcode, transcribe

use crate::audio::{TargetSpec, TranscodeError};
use crate::llm::LlmError;
use crate::runtime::{AudioTranscoder, ChatPlatform, CompletionProvider};
use crate::telegram::{TelegramError, Voice};
use thiserror::Error;

/// Container type Telegram uses for voice notes
pub const DEFAULT_VOICE_MIME: &str = "audio/ogg";

/// Source format handed to the encoder for accepted voice notes
const SOURCE_FORMAT: &str = "ogg";

/// Reference to a voice attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceRef {
    pub file_id: String,
    pub mime_type: Option<String>,
}

impl From<&Voice> for VoiceRef {
    fn from(voice: &Voice) -> Self {
        Self {
            file_id: voice.file_id.clone(),
            mime_type: voice.mime_type.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Unsupported voice format: {0:?}")]
    UnsupportedFormat(Option<String>),
    #[error("Fetching voice failed: {0}")]
    FetchFailed(#[source] TelegramError),
    #[error("Transcoding voice failed: {0}")]
    TranscodeFailed(#[source] TranscodeError),
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(#[source] LlmError),
}

/// Turns a voice reference into text. Borrows its collaborators for the
/// duration of one resolution; no retries.
pub struct VoiceResolver<'a, P: ?Sized, T: ?Sized, C: ?Sized> {
    platform: &'a P,
    transcoder: &'a T,
    provider: &'a C,
    accepted_mime: &'a str,
}

impl<'a, P, T, C> VoiceResolver<'a, P, T, C>
where
    P: ChatPlatform + ?Sized,
    T: AudioTranscoder + ?Sized,
    C: CompletionProvider + ?Sized,
{
    pub fn new(platform: &'a P, transcoder: &'a T, provider: &'a C, accepted_mime: &'a str) -> Self {
        Self {
            platform,
            transcoder,
            provider,
            accepted_mime,
        }
    }

    /// Whether the declared mime type is the accepted container
    pub fn accepts(&self, voice: &VoiceRef) -> bool {
        voice.mime_type.as_deref() == Some(self.accepted_mime)
    }

    pub async fn resolve(&self, voice: &VoiceRef) -> Result<String, VoiceError> {
        if !self.accepts(voice) {
            return Err(VoiceError::UnsupportedFormat(voice.mime_type.clone()));
        }

        let location = self
            .platform
            .fetch_file_location(&voice.file_id)
            .await
            .map_err(VoiceError::FetchFailed)?;

        let raw = self
            .platform
            .download_file(&location)
            .await
            .map_err(VoiceError::FetchFailed)?;
        if raw.is_empty() {
            return Err(VoiceError::FetchFailed(TelegramError::EmptyPayload));
        }
        tracing::debug!(file_id = %voice.file_id, bytes = raw.len(), "Voice downloaded");

        let encoded = self
            .transcoder
            .transcode(&raw, SOURCE_FORMAT, &TargetSpec::SPEECH)
            .await
            .map_err(VoiceError::TranscodeFailed)?;
        if encoded.is_empty() {
            return Err(VoiceError::TranscodeFailed(TranscodeError::EmptyOutput));
        }
        tracing::debug!(bytes = encoded.len(), "Voice transcoded");

        let transcription = self
            .provider
            .transcribe(encoded)
            .await
            .map_err(VoiceError::TranscriptionFailed)?;

        Ok(transcription.text)
    }
}
