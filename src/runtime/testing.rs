//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use super::{DispatchConfig, Dispatcher, ErrorPolicy};
use crate::audio::{TargetSpec, TranscodeError};
use crate::llm::{Completion, LlmError, Transcription};
use crate::session::ChatMessage;
use crate::telegram::{
    Chat, FileLocation, Message, MessageEntity, TelegramError, Update, User, Voice,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock Chat Platform
// ============================================================================

/// Mock chat platform serving in-memory files and recording sends
#[derive(Default)]
pub struct MockChatPlatform {
    files: HashMap<String, Vec<u8>>,
    fail_sends: bool,
    fetches: Mutex<Vec<String>>,
    downloads: Mutex<Vec<FileLocation>>,
    sent: Mutex<Vec<(i64, String)>>,
}

impl MockChatPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `data` for `file_id`
    #[must_use]
    pub fn with_file(mut self, file_id: impl Into<String>, data: Vec<u8>) -> Self {
        self.files.insert(file_id.into(), data);
        self
    }

    /// Make every `send_message` fail
    #[must_use]
    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn download_calls(&self) -> Vec<FileLocation> {
        self.downloads.lock().unwrap().clone()
    }

    /// Messages sent (including failed attempts)
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of network calls of any kind
    pub fn call_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
            + self.downloads.lock().unwrap().len()
            + self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatPlatform for MockChatPlatform {
    async fn fetch_file_location(&self, file_id: &str) -> Result<FileLocation, TelegramError> {
        self.fetches.lock().unwrap().push(file_id.to_string());
        if self.files.contains_key(file_id) {
            Ok(FileLocation {
                file_id: file_id.to_string(),
                path: format!("voice/{file_id}.oga"),
            })
        } else {
            Err(TelegramError::Api("Bad Request: invalid file_id".to_string()))
        }
    }

    async fn download_file(&self, location: &FileLocation) -> Result<Vec<u8>, TelegramError> {
        self.downloads.lock().unwrap().push(location.clone());
        self.files
            .get(&location.file_id)
            .cloned()
            .ok_or(TelegramError::Status {
                status: 404,
                body: "Not Found".to_string(),
            })
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        if self.fail_sends {
            return Err(TelegramError::Api("Forbidden: bot was blocked by the user".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Mock Completion Provider
// ============================================================================

/// Mock provider that returns queued completions and transcriptions
#[derive(Default)]
pub struct MockCompletionProvider {
    completions: Mutex<VecDeque<Result<Completion, LlmError>>>,
    transcriptions: Mutex<VecDeque<Result<String, LlmError>>>,
    /// Record of all completion requests made
    requests: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    transcription_inputs: Mutex<Vec<Vec<u8>>>,
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a single-choice completion
    pub fn queue_reply(&self, content: impl Into<String>) {
        self.queue_completion(Ok(Completion::single(content)));
    }

    pub fn queue_completion(&self, completion: Result<Completion, LlmError>) {
        self.completions.lock().unwrap().push_back(completion);
    }

    pub fn queue_transcription(&self, result: Result<String, LlmError>) {
        self.transcriptions.lock().unwrap().push_back(result);
    }

    /// Recorded `(model, history)` pairs
    pub fn recorded_requests(&self) -> Vec<(String, Vec<ChatMessage>)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn transcription_inputs(&self) -> Vec<Vec<u8>> {
        self.transcription_inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn create_completion(
        &self,
        model: &str,
        history: &[ChatMessage],
    ) -> Result<Completion, LlmError> {
        self.requests
            .lock()
            .unwrap()
            .push((model.to_string(), history.to_vec()));
        self.completions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock completion queued")))
    }

    async fn transcribe(&self, audio: Vec<u8>) -> Result<Transcription, LlmError> {
        self.transcription_inputs.lock().unwrap().push(audio);
        self.transcriptions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock transcription queued")))
            .map(|text| Transcription { text })
    }
}

// ============================================================================
// Mock Transcoder
// ============================================================================

/// Mock encoder with a fixed output
pub struct MockTranscoder {
    output: Option<Vec<u8>>,
    inputs: Mutex<Vec<Vec<u8>>>,
    targets: Mutex<Vec<TargetSpec>>,
}

impl MockTranscoder {
    pub fn succeeding(output: Vec<u8>) -> Self {
        Self {
            output: Some(output),
            inputs: Mutex::new(Vec::new()),
            targets: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as if the encoder exited non-zero
    pub fn failing() -> Self {
        Self {
            output: None,
            inputs: Mutex::new(Vec::new()),
            targets: Mutex::new(Vec::new()),
        }
    }

    pub fn inputs(&self) -> Vec<Vec<u8>> {
        self.inputs.lock().unwrap().clone()
    }

    pub fn targets(&self) -> Vec<TargetSpec> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioTranscoder for MockTranscoder {
    async fn transcode(
        &self,
        input: &[u8],
        _source_format: &str,
        target: &TargetSpec,
    ) -> Result<Vec<u8>, TranscodeError> {
        self.inputs.lock().unwrap().push(input.to_vec());
        self.targets.lock().unwrap().push(*target);
        self.output.clone().ok_or(TranscodeError::Exit {
            code: Some(1),
            stderr: "Invalid data found when processing input".to_string(),
        })
    }
}

// ============================================================================
// Mock Update Feed
// ============================================================================

/// Mock `getUpdates` source returning queued batches
#[derive(Default)]
pub struct MockUpdateFeed {
    batches: Mutex<VecDeque<Result<Vec<Update>, TelegramError>>>,
    offsets: Mutex<Vec<i64>>,
}

impl MockUpdateFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_batch(&self, batch: Result<Vec<Update>, TelegramError>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    /// Offsets passed to each `get_updates` call
    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateFeed for MockUpdateFeed {
    async fn get_updates(
        &self,
        offset: i64,
        _timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                // Stand-in for a long poll that times out with nothing new
                tokio::time::sleep(Duration::from_millis(2)).await;
                Ok(Vec::new())
            }
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub const TEST_CHAT: i64 = 4242;
pub const END_NOTICE: &str = "Session ended.";

pub type TestDispatcher =
    Dispatcher<Arc<MockChatPlatform>, Arc<MockCompletionProvider>, Arc<MockTranscoder>>;

pub fn test_config() -> DispatchConfig {
    DispatchConfig {
        model: "test-model".to_string(),
        system_prompts: vec![
            "You are an English tutor.".to_string(),
            "Answer in one sentence.".to_string(),
        ],
        require_explicit_start: false,
        end_notice: END_NOTICE.to_string(),
        voice_mime: "audio/ogg".to_string(),
        error_policy: ErrorPolicy::FailSilent,
    }
}

/// Mocks plus a dispatcher wired to them
pub struct Harness {
    pub platform: Arc<MockChatPlatform>,
    pub provider: Arc<MockCompletionProvider>,
    pub transcoder: Arc<MockTranscoder>,
    pub dispatcher: Arc<TestDispatcher>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(
            MockChatPlatform::new(),
            MockTranscoder::succeeding(b"ID3-mp3".to_vec()),
            test_config(),
        )
    }

    pub fn build(
        platform: MockChatPlatform,
        transcoder: MockTranscoder,
        config: DispatchConfig,
    ) -> Self {
        let platform = Arc::new(platform);
        let provider = Arc::new(MockCompletionProvider::new());
        let transcoder = Arc::new(transcoder);
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&platform),
            Arc::clone(&provider),
            Arc::clone(&transcoder),
            config,
        ));
        Self {
            platform,
            provider,
            transcoder,
            dispatcher,
        }
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.dispatcher.session().lock().await.history().to_vec()
    }
}

fn base_message(text: Option<&str>) -> Message {
    Message {
        id: 1,
        text: text.map(str::to_string),
        from: Some(User {
            id: 7,
            is_bot: false,
            first_name: "Ada".to_string(),
            ..User::default()
        }),
        chat: Some(Chat {
            id: TEST_CHAT,
            kind: "private".to_string(),
        }),
        ..Message::default()
    }
}

pub fn text_update(id: i64, text: &str) -> Update {
    Update {
        id,
        message: Some(base_message(Some(text))),
    }
}

pub fn command_update(id: i64, command: &str) -> Update {
    let mut message = base_message(Some(command));
    message.entities = vec![MessageEntity::bot_command(command.len())];
    Update {
        id,
        message: Some(message),
    }
}

pub fn voice_update(id: i64, file_id: &str, mime_type: Option<&str>) -> Update {
    let mut message = base_message(None);
    message.voice = Some(Voice {
        file_id: file_id.to_string(),
        duration: 2,
        mime_type: mime_type.map(str::to_string),
        ..Voice::default()
    });
    Update {
        id,
        message: Some(message),
    }
}

pub fn bot_update(id: i64, text: &str) -> Update {
    let mut update = text_update(id, text);
    if let Some(from) = update.message.as_mut().and_then(|m| m.from.as_mut()) {
        from.is_bot = true;
    }
    update
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::dispatcher::{AbortReason, TurnOutcome};
    use crate::runtime::TurnError;
    use crate::session::{Role, SessionState};

    #[tokio::test]
    async fn test_mock_provider_queue() {
        let provider = MockCompletionProvider::new();
        provider.queue_reply("Hello");

        let completion = provider.create_completion("m", &[]).await.unwrap();
        assert_eq!(completion.first_content(), Some("Hello"));

        // Second call should fail (no more responses)
        assert!(provider.create_completion("m", &[]).await.is_err());
        assert_eq!(provider.recorded_requests().len(), 2);
    }

    /// Scenario A: `/start` on an empty session seeds it and sends nothing
    #[tokio::test]
    async fn test_start_command_seeds_session() {
        let h = Harness::new();

        let outcome = h.dispatcher.handle(command_update(1, "/start")).await;

        assert_eq!(outcome, TurnOutcome::AbortedSilently(AbortReason::SessionStarted));
        let session = h.dispatcher.session().lock().await;
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.history().len(), 2);
        drop(session);
        assert!(h.platform.sent().is_empty());
        assert!(h.provider.recorded_requests().is_empty());
    }

    /// Scenario B: plain text on an empty session auto-starts and replies
    #[tokio::test]
    async fn test_text_auto_starts_and_replies() {
        let h = Harness::new();
        h.provider.queue_reply("Hi! How can I help?");

        let outcome = h.dispatcher.handle(text_update(1, "Hello")).await;
        assert_eq!(outcome, TurnOutcome::Replied);

        let requests = h.provider.recorded_requests();
        assert_eq!(requests.len(), 1);
        let (model, context) = &requests[0];
        assert_eq!(model, "test-model");
        assert_eq!(context.len(), 3);
        assert_eq!(context[2], ChatMessage::user("Hello"));

        let history = h.history().await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role(), Role::System);
        assert_eq!(history[2], ChatMessage::user("Hello"));
        assert_eq!(history[3], ChatMessage::assistant("Hi! How can I help?"));

        assert_eq!(
            h.platform.sent(),
            vec![(TEST_CHAT, "Hi! How can I help?".to_string())]
        );
    }

    /// Scenario C: a voice note is transcribed and used as the user message
    #[tokio::test]
    async fn test_voice_turn_uses_transcription() {
        let h = Harness::build(
            MockChatPlatform::new().with_file("abc", b"OggS".to_vec()),
            MockTranscoder::succeeding(b"ID3".to_vec()),
            test_config(),
        );
        h.provider.queue_transcription(Ok("hi".to_string()));
        h.provider.queue_reply("Hello there");

        let outcome = h
            .dispatcher
            .handle(voice_update(5, "abc", Some("audio/ogg")))
            .await;

        assert_eq!(outcome, TurnOutcome::Replied);
        let history = h.history().await;
        assert_eq!(history[2], ChatMessage::user("hi"));
        assert_eq!(h.transcoder.inputs(), vec![b"OggS".to_vec()]);
        assert_eq!(h.provider.transcription_inputs(), vec![b"ID3".to_vec()]);
    }

    /// Scenario C, failure branch: nothing appended, nothing sent
    #[tokio::test]
    async fn test_voice_transcription_failure_is_silent() {
        let h = Harness::build(
            MockChatPlatform::new().with_file("abc", b"OggS".to_vec()),
            MockTranscoder::succeeding(b"ID3".to_vec()),
            test_config(),
        );
        h.provider
            .queue_transcription(Err(LlmError::server_error("Server error: overloaded")));

        let outcome = h
            .dispatcher
            .handle(voice_update(5, "abc", Some("audio/ogg")))
            .await;

        assert!(matches!(
            outcome,
            TurnOutcome::AbortedSilently(AbortReason::Failed(TurnError::TranscriptionFailed(_)))
        ));
        assert!(h.history().await.is_empty());
        assert!(h.platform.sent().is_empty());
        assert!(h.provider.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_voice_never_fetches() {
        let h = Harness::build(
            MockChatPlatform::new().with_file("abc", b"RIFF".to_vec()),
            MockTranscoder::succeeding(b"ID3".to_vec()),
            test_config(),
        );

        let outcome = h
            .dispatcher
            .handle(voice_update(5, "abc", Some("audio/wav")))
            .await;

        assert!(matches!(
            outcome,
            TurnOutcome::AbortedSilently(AbortReason::Failed(TurnError::UnsupportedFormat(_)))
        ));
        assert!(h.platform.fetch_calls().is_empty());
        assert!(h.platform.sent().is_empty());
    }

    /// Scenario D: `/end` clears the session and sends the notice only
    #[tokio::test]
    async fn test_end_command_clears_and_notifies() {
        let h = Harness::new();
        h.provider.queue_reply("Sure");
        h.dispatcher.handle(text_update(1, "Hello")).await;

        let outcome = h.dispatcher.handle(command_update(2, "/end")).await;

        assert_eq!(outcome, TurnOutcome::AbortedWithNotice);
        assert_eq!(
            h.dispatcher.session().lock().await.state(),
            SessionState::Empty
        );
        assert!(h.history().await.is_empty());
        let sent = h.platform.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1], (TEST_CHAT, END_NOTICE.to_string()));
        assert_eq!(h.provider.recorded_requests().len(), 1);
    }

    /// Scenario E: bot-authored updates touch nothing
    #[tokio::test]
    async fn test_bot_sender_ignored() {
        let h = Harness::new();

        let outcome = h.dispatcher.handle(bot_update(9, "echo")).await;

        assert!(matches!(
            outcome,
            TurnOutcome::AbortedSilently(AbortReason::Failed(TurnError::Validation(_)))
        ));
        assert_eq!(
            h.dispatcher.session().lock().await.state(),
            SessionState::Empty
        );
        assert_eq!(h.platform.call_count(), 0);
        assert!(h.provider.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_updates_dropped() {
        let h = Harness::new();

        let zero_id = text_update(0, "Hello");
        let no_message = Update {
            id: 3,
            message: None,
        };
        let mut no_chat = text_update(4, "Hello");
        no_chat.message.as_mut().unwrap().chat = None;

        for update in [zero_id, no_message, no_chat] {
            let outcome = h.dispatcher.handle(update).await;
            assert!(matches!(
                outcome,
                TurnOutcome::AbortedSilently(AbortReason::Failed(TurnError::Validation(_)))
            ));
        }
        assert_eq!(h.platform.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_never_requests_completion() {
        let h = Harness::new();

        let outcome = h.dispatcher.handle(text_update(1, "   ")).await;

        assert_eq!(outcome, TurnOutcome::AbortedSilently(AbortReason::EmptyContent));
        assert!(h.provider.recorded_requests().is_empty());
        assert_eq!(
            h.dispatcher.session().lock().await.state(),
            SessionState::Empty
        );
    }

    #[tokio::test]
    async fn test_empty_transcription_never_requests_completion() {
        let h = Harness::build(
            MockChatPlatform::new().with_file("abc", b"OggS".to_vec()),
            MockTranscoder::succeeding(b"ID3".to_vec()),
            test_config(),
        );
        h.provider.queue_transcription(Ok(String::new()));

        let outcome = h
            .dispatcher
            .handle(voice_update(5, "abc", Some("audio/ogg")))
            .await;

        assert_eq!(outcome, TurnOutcome::AbortedSilently(AbortReason::EmptyContent));
        assert!(h.provider.recorded_requests().is_empty());
        assert!(h.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command_ignored() {
        let h = Harness::new();

        let outcome = h.dispatcher.handle(command_update(1, "/help")).await;

        assert_eq!(
            outcome,
            TurnOutcome::AbortedSilently(AbortReason::UnknownCommand("/help".to_string()))
        );
        assert_eq!(h.platform.call_count(), 0);
        assert!(h.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_completion_failure_leaves_history_untouched() {
        let h = Harness::new();
        h.provider.queue_reply("first");
        h.dispatcher.handle(text_update(1, "one")).await;
        h.provider.queue_completion(Err(LlmError::rate_limit("slow down")));

        let outcome = h.dispatcher.handle(text_update(2, "two")).await;

        assert!(matches!(
            outcome,
            TurnOutcome::AbortedSilently(AbortReason::Failed(TurnError::CompletionFailed(_)))
        ));
        let history = h.history().await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[3], ChatMessage::assistant("first"));
        assert_eq!(h.platform.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_completion_without_choices_fails() {
        let h = Harness::new();
        h.provider.queue_completion(Ok(Completion::default()));

        let outcome = h.dispatcher.handle(text_update(1, "Hello")).await;

        assert!(matches!(
            outcome,
            TurnOutcome::AbortedSilently(AbortReason::Failed(TurnError::CompletionFailed(_)))
        ));
        assert!(h.platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_keeps_exchange() {
        let h = Harness::build(
            MockChatPlatform::new().failing_sends(),
            MockTranscoder::succeeding(Vec::new()),
            test_config(),
        );
        h.provider.queue_reply("lost reply");

        let outcome = h.dispatcher.handle(text_update(1, "Hello")).await;

        assert!(matches!(
            outcome,
            TurnOutcome::AbortedSilently(AbortReason::Failed(TurnError::SendFailed(_)))
        ));
        assert_eq!(h.history().await.len(), 4);
        assert_eq!(h.platform.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_history_accumulates_in_order() {
        let h = Harness::new();
        for i in 1..=3 {
            h.provider.queue_reply(format!("answer {i}"));
            let outcome = h.dispatcher.handle(text_update(i, &format!("question {i}"))).await;
            assert_eq!(outcome, TurnOutcome::Replied);
        }

        let contents: Vec<String> = h.history().await[2..]
            .iter()
            .map(|m| m.content().to_string())
            .collect();
        assert_eq!(
            contents,
            vec![
                "question 1", "answer 1", "question 2", "answer 2", "question 3", "answer 3"
            ]
        );

        // The last request carried the whole conversation so far
        let requests = h.provider.recorded_requests();
        assert_eq!(requests[2].1.len(), 2 + 5);
    }

    #[tokio::test]
    async fn test_restart_discards_previous_turns() {
        let h = Harness::new();
        h.provider.queue_reply("noted");
        h.dispatcher.handle(text_update(1, "remember this")).await;

        h.dispatcher.handle(command_update(2, "/start")).await;

        assert_eq!(h.history().await.len(), 2);
    }

    #[tokio::test]
    async fn test_explicit_start_required() {
        let mut config = test_config();
        config.require_explicit_start = true;
        let h = Harness::build(
            MockChatPlatform::new(),
            MockTranscoder::succeeding(Vec::new()),
            config,
        );

        let outcome = h.dispatcher.handle(text_update(1, "Hello")).await;
        assert_eq!(outcome, TurnOutcome::AbortedSilently(AbortReason::NotStarted));
        assert!(h.provider.recorded_requests().is_empty());

        h.dispatcher.handle(command_update(2, "/start")).await;
        h.provider.queue_reply("Welcome");
        let outcome = h.dispatcher.handle(text_update(3, "Hello")).await;
        assert_eq!(outcome, TurnOutcome::Replied);
    }

    #[tokio::test]
    async fn test_notify_policy_sends_notice_on_failure() {
        let mut config = test_config();
        config.error_policy = ErrorPolicy::Notify {
            message: "Sorry, something went wrong.".to_string(),
        };
        let h = Harness::build(
            MockChatPlatform::new(),
            MockTranscoder::succeeding(Vec::new()),
            config,
        );
        h.provider.queue_completion(Err(LlmError::auth("bad key")));

        let outcome = h.dispatcher.handle(text_update(1, "Hello")).await;
        assert_eq!(outcome, TurnOutcome::AbortedWithNotice);
        assert_eq!(
            h.platform.sent(),
            vec![(TEST_CHAT, "Sorry, something went wrong.".to_string())]
        );

        // Validation drops stay silent even in notify mode
        h.dispatcher.handle(bot_update(2, "echo")).await;
        assert_eq!(h.platform.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_turns_are_serialized() {
        let h = Arc::new(Harness::new());
        for i in 0..8 {
            h.provider.queue_reply(format!("reply {i}"));
        }

        let mut handles = Vec::new();
        for i in 1..=8 {
            let h = Arc::clone(&h);
            handles.push(tokio::spawn(async move {
                h.dispatcher.handle(text_update(i, &format!("msg {i}"))).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), TurnOutcome::Replied);
        }

        // Every user message is immediately followed by its own assistant reply
        let history = h.history().await;
        assert_eq!(history.len(), 2 + 16);
        for pair in history[2..].chunks(2) {
            assert_eq!(pair[0].role(), Role::User);
            assert_eq!(pair[1].role(), Role::Assistant);
        }
    }
}
