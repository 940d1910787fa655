//! Audio transcoding through an external encoder
//!
//! Voice notes arrive as Opus-in-Ogg; the transcription endpoint gets a
//! small mono mp3. Conversion is delegated to `ffmpeg`, fed through scratch
//! files that live in a per-invocation temporary directory.

use crate::runtime::AudioTranscoder;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const STDERR_TAIL: usize = 2 * 1024;

/// Output parameters for the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    pub channels: u8,
    pub sample_rate: u32,
    /// Bitrate in kbit/s
    pub bitrate_kbps: u32,
    /// Container/format name understood by the encoder
    pub format: &'static str,
}

impl TargetSpec {
    /// Mono, 48 kHz, 36 kbit/s mp3: plenty for speech recognition
    pub const SPEECH: TargetSpec = TargetSpec {
        channels: 1,
        sample_rate: 48_000,
        bitrate_kbps: 36,
        format: "mp3",
    };
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Scratch file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Encoder exited with {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },
    #[error("Encoder timed out after {0:?}")]
    Timeout(Duration),
    #[error("Encoder produced no output")]
    EmptyOutput,
}

/// `AudioTranscoder` backed by an `ffmpeg` binary
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    scratch_dir: Option<PathBuf>,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            scratch_dir: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Resolve `ffmpeg` on `PATH`, falling back to the bare name
    pub fn locate() -> Self {
        match which::which("ffmpeg") {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Found ffmpeg");
                Self::new(path)
            }
            Err(e) => {
                tracing::warn!(error = %e, "ffmpeg not found on PATH; voice messages will fail");
                Self::new("ffmpeg")
            }
        }
    }

    /// Parent directory for per-invocation scratch dirs (system temp by default)
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn scratch(&self) -> std::io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("shadow-voice-");
        match &self.scratch_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }
    }

    fn build_args(input: &Path, output: &Path, target: &TargetSpec) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-vn".to_string(),
            "-ar".to_string(),
            target.sample_rate.to_string(),
            "-ac".to_string(),
            target.channels.to_string(),
            "-b:a".to_string(),
            format!("{}k", target.bitrate_kbps),
            "-f".to_string(),
            target.format.to_string(),
            output.display().to_string(),
        ]
    }

    fn stderr_tail(stderr: &[u8]) -> String {
        let text = String::from_utf8_lossy(stderr);
        let chars: Vec<char> = text.trim().chars().collect();
        let skip = chars.len().saturating_sub(STDERR_TAIL);
        chars.into_iter().skip(skip).collect()
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        input: &[u8],
        source_format: &str,
        target: &TargetSpec,
    ) -> Result<Vec<u8>, TranscodeError> {
        // Removed on drop, whichever way this function returns
        let scratch = self.scratch()?;
        let input_path = scratch.path().join(format!("voice.{source_format}"));
        let output_path = scratch.path().join(format!("voice.{}", target.format));

        tokio::fs::write(&input_path, input).await?;
        tracing::debug!(path = %input_path.display(), bytes = input.len(), "Wrote encoder input");

        let mut cmd = Command::new(&self.program);
        cmd.args(Self::build_args(&input_path, &output_path, target))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| TranscodeError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| TranscodeError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(TranscodeError::Exit {
                code: output.status.code(),
                stderr: Self::stderr_tail(&output.stderr),
            });
        }

        let encoded = match tokio::fs::read(&output_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TranscodeError::EmptyOutput)
            }
            Err(e) => return Err(e.into()),
        };

        if encoded.is_empty() {
            return Err(TranscodeError::EmptyOutput);
        }

        tracing::debug!(bytes = encoded.len(), format = target.format, "Encoder finished");
        Ok(encoded)
    }
}
