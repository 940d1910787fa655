//! `OpenAI` and `OpenAI`-compatible provider implementation

use super::types::{Choice, Completion, Transcription, Usage};
use super::LlmError;
use crate::runtime::CompletionProvider;
use crate::session::ChatMessage;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_LANGUAGE: &str = "en";

/// File name and type the transcoded audio is uploaded as
const UPLOAD_FILE_NAME: &str = "audio.mp3";
const UPLOAD_MIME: &str = "audio/mpeg";

/// Settings for the audio transcription endpoint
#[derive(Debug, Clone)]
pub struct TranscriptionOptions {
    pub model: String,
    pub language: String,
    /// Optional hint passed as the `prompt` field
    pub prompt: Option<String>,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            prompt: None,
        }
    }
}

/// OpenAI-compatible service implementation
pub struct OpenAIService {
    client: Client,
    api_key: String,
    base_url: String,
    transcription: TranscriptionOptions,
}

impl OpenAIService {
    pub fn new(
        api_key: String,
        base_url: Option<&str>,
        transcription: TranscriptionOptions,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            transcription,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    fn translate_request(model: &str, history: &[ChatMessage]) -> OpenAIRequest {
        OpenAIRequest {
            model: model.to_string(),
            messages: history
                .iter()
                .map(|msg| OpenAIMessage {
                    role: msg.role().as_str().to_string(),
                    content: Some(msg.content().to_string()),
                })
                .collect(),
        }
    }

    fn normalize_response(resp: OpenAIResponse) -> Completion {
        let choices = resp
            .choices
            .into_iter()
            .map(|choice| Choice {
                content: choice.message.content.unwrap_or_default(),
            })
            .collect();

        let usage = resp.usage.map_or_else(Usage::default, |u| Usage {
            input_tokens: u64::from(u.prompt_tokens),
            output_tokens: u64::from(u.completion_tokens),
        });

        Completion { choices, usage }
    }

    fn build_transcription_form(&self, audio: Vec<u8>) -> Result<Form, LlmError> {
        let part = Part::bytes(audio)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(UPLOAD_MIME)
            .map_err(|e| LlmError::invalid_request(format!("Invalid upload type: {e}")))?;

        let mut form = Form::new()
            .part("file", part)
            .text("model", self.transcription.model.clone())
            .text("language", self.transcription.language.clone())
            .text("response_format", "json");

        if let Some(prompt) = self.transcription.prompt.as_ref().filter(|p| !p.is_empty()) {
            form = form.text("prompt", prompt.clone());
        }

        Ok(form)
    }

    fn map_send_error(e: &reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::network(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            LlmError::network(format!("Connection failed: {e}"))
        } else {
            LlmError::unknown(format!("Request failed: {e}"))
        }
    }

    /// Read the body and turn a non-success status into a classified error
    async fn read_body(response: reqwest::Response) -> Result<String, LlmError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OpenAIErrorResponse>(&body)
                .map_or(body, |resp| resp.error.message);
            return Err(LlmError::from_status(status.as_u16(), &message));
        }

        Ok(body)
    }
}

#[async_trait]
impl CompletionProvider for OpenAIService {
    async fn create_completion(
        &self,
        model: &str,
        history: &[ChatMessage],
    ) -> Result<Completion, LlmError> {
        let request = Self::translate_request(model, history);

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::map_send_error(&e))?;

        let body = Self::read_body(response).await?;

        let parsed: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::decode(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Ok(Self::normalize_response(parsed))
    }

    async fn transcribe(&self, audio: Vec<u8>) -> Result<Transcription, LlmError> {
        let form = self.build_transcription_form(audio)?;

        let response = self
            .client
            .post(self.endpoint("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::map_send_error(&e))?;

        let body = Self::read_body(response).await?;

        let parsed: TranscriptionResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::decode(format!("Failed to parse transcription: {e} - body: {body}"))
        })?;

        Ok(Transcription { text: parsed.text })
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}
