//! What the user sees when a turn fails

use super::TurnError;

/// Error reporting policy consulted once per failed turn
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log and drop; the user sees nothing
    #[default]
    FailSilent,
    /// Reply with a fixed notice when the pipeline fails
    Notify { message: String },
}

impl ErrorPolicy {
    /// Notice to send for `error`, if any. Validation drops and failed sends
    /// never produce one.
    pub fn notice_for(&self, error: &TurnError) -> Option<&str> {
        match self {
            ErrorPolicy::FailSilent => None,
            ErrorPolicy::Notify { message } => match error {
                TurnError::Validation(_) | TurnError::SendFailed(_) => None,
                TurnError::UnsupportedFormat(_)
                | TurnError::FetchFailed(_)
                | TurnError::TranscodeFailed(_)
                | TurnError::TranscriptionFailed(_)
                | TurnError::CompletionFailed(_) => Some(message.as_str()),
            },
        }
    }
}
