//! Provider-neutral completion and transcription results

/// Result of a chat completion request
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl Completion {
    /// Convenience constructor for a single-choice completion
    #[cfg(test)]
    pub fn single(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                content: content.into(),
            }],
            usage: Usage::default(),
        }
    }

    /// Content of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.content.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Choice {
    pub content: String,
}

/// Result of a transcription request
#[derive(Debug, Clone, Default)]
pub struct Transcription {
    pub text: String,
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
