//! Process configuration from environment variables

use crate::llm::TranscriptionOptions;
use crate::runtime::{DispatchConfig, ErrorPolicy};
use crate::voice::DEFAULT_VOICE_MIME;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_END_NOTICE: &str = "Session ended. Send /start to begin a new one.";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// How updates reach the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMode {
    /// Telegram POSTs updates to our HTTP endpoint
    Webhook,
    /// We long-poll `getUpdates`
    Polling,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub telegram_api_base: Option<String>,
    /// `None` sends replies as plain text. Replies whose markup Telegram
    /// rejects are resent without a parse mode.
    pub parse_mode: Option<String>,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub transcription: TranscriptionOptions,
    pub host: String,
    pub port: u16,
    pub mode: InboundMode,
    /// Public URL to register with `setWebhook` at startup
    pub webhook_url: Option<String>,
    pub ffmpeg: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub request_timeout: Duration,
    pub dispatch: DispatchConfig,
}

impl Config {
    /// Read the process environment after merging in a `.env` file, if one
    /// is found. Variables already set win over the file.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_file(None);
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telegram_token = get("TELEGRAM_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?;
        let openai_api_key = get("OPENAI_API_KEY")
            .or_else(|| get("OPENAI_TOKEN"))
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let mode = match get("SHADOW_MODE").as_deref().map(str::trim) {
            None | Some("webhook") => InboundMode::Webhook,
            Some("polling") => InboundMode::Polling,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "SHADOW_MODE",
                    value: other.to_string(),
                })
            }
        };

        let require_explicit_start = match get("SHADOW_REQUIRE_EXPLICIT_START") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                var: "SHADOW_REQUIRE_EXPLICIT_START",
                value: raw,
            })?,
            None => false,
        };

        let request_timeout = match get("SHADOW_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                ConfigError::Invalid {
                    var: "SHADOW_REQUEST_TIMEOUT_SECS",
                    value: raw,
                }
            })?),
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let mut system_prompts: Vec<String> = ["PROMT_TUTOR", "PROMT_TUTOR_ACCENT"]
            .into_iter()
            .filter_map(get)
            .collect();
        if system_prompts.is_empty() {
            system_prompts.push(DEFAULT_SYSTEM_PROMPT.to_string());
        }

        let parse_mode = match get("SHADOW_PARSE_MODE").as_deref() {
            Some("none" | "plain") => None,
            Some(mode) => Some(mode.to_string()),
            None => Some("Markdown".to_string()),
        };

        let error_policy = get("SHADOW_ERROR_REPLY")
            .map_or(ErrorPolicy::FailSilent, |message| ErrorPolicy::Notify { message });

        let transcription = TranscriptionOptions {
            model: get("SHADOW_TRANSCRIPTION_MODEL")
                .unwrap_or_else(|| TranscriptionOptions::default().model),
            language: get("SHADOW_LANGUAGE")
                .unwrap_or_else(|| TranscriptionOptions::default().language),
            prompt: get("PROMT_TRANSCRIPTION"),
        };

        Ok(Self {
            telegram_token,
            telegram_api_base: get("TELEGRAM_API_BASE"),
            parse_mode,
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL"),
            transcription,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            mode,
            webhook_url: get("SHADOW_WEBHOOK_URL"),
            ffmpeg: get("SHADOW_FFMPEG").map(PathBuf::from),
            scratch_dir: get("SHADOW_SCRATCH_DIR").map(PathBuf::from),
            request_timeout,
            dispatch: DispatchConfig {
                model: get("SHADOW_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                system_prompts,
                require_explicit_start,
                end_notice: get("SHADOW_END_NOTICE")
                    .unwrap_or_else(|| DEFAULT_END_NOTICE.to_string()),
                voice_mime: get("SHADOW_VOICE_MIME")
                    .unwrap_or_else(|| DEFAULT_VOICE_MIME.to_string()),
                error_policy,
            },
        })
    }

    /// Socket address string for the HTTP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Merge `path` (or the nearest `.env` when `None`) into the process env
fn load_env_file(path: Option<&Path>) {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable environment file"),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
