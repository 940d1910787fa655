//! Long-polling update loop
//!
//! Alternative to the webhook for deployments without a public URL. Each
//! batch is handled in order before the offset is advanced past it.

use super::dispatcher::Dispatcher;
use super::traits::{AudioTranscoder, ChatPlatform, CompletionProvider, UpdateFeed};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const LONG_POLL_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

pub struct Poller<F, P, C, T> {
    feed: F,
    dispatcher: Arc<Dispatcher<P, C, T>>,
    offset: i64,
    /// Last offset handed to Telegram, which acknowledges everything below it
    confirmed: i64,
    timeout: Duration,
    backoff: Duration,
}

impl<F, P, C, T> Poller<F, P, C, T>
where
    F: UpdateFeed,
    P: ChatPlatform,
    C: CompletionProvider,
    T: AudioTranscoder,
{
    pub fn new(feed: F, dispatcher: Arc<Dispatcher<P, C, T>>) -> Self {
        Self {
            feed,
            dispatcher,
            offset: 0,
            confirmed: 0,
            timeout: LONG_POLL_TIMEOUT,
            backoff: ERROR_BACKOFF,
        }
    }

    /// Fetch and handle one batch. Returns how many updates were handled.
    pub async fn poll_once(&mut self) -> Result<usize, crate::telegram::TelegramError> {
        let requested = self.offset;
        let updates = self.feed.get_updates(requested, self.timeout).await?;
        self.confirmed = requested;
        let count = updates.len();

        for update in updates {
            // Acknowledged even when the turn fails
            self.offset = self.offset.max(update.id + 1);
            let outcome = self.dispatcher.handle(update).await;
            tracing::debug!(?outcome, offset = self.offset, "Polled update handled");
        }

        Ok(count)
    }

    /// Poll until `cancel` fires
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!("Long polling for updates");
        loop {
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.poll_once() => result,
            };

            if let Err(e) = result {
                tracing::warn!(error = %e, backoff_secs = self.backoff.as_secs(), "getUpdates failed");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(self.backoff) => {}
                }
            }
        }
        self.confirm().await;
        tracing::info!(offset = self.offset, "Polling stopped");
    }

    /// Acknowledge handled updates that no `getUpdates` call has carried yet,
    /// so they are not redelivered after a restart
    async fn confirm(&mut self) {
        if self.offset <= self.confirmed {
            return;
        }
        match self.feed.get_updates(self.offset, Duration::ZERO).await {
            Ok(_) => self.confirmed = self.offset,
            Err(e) => tracing::warn!(error = %e, offset = self.offset, "Failed to confirm offset"),
        }
    }
}
