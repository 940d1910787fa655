//! Shadow - Telegram tutor bot
//!
//! Relays chat and voice messages to an OpenAI-compatible completion API
//! inside one shared conversation session.

mod api;
mod audio;
mod command;
mod config;
mod llm;
mod runtime;
mod session;
mod telegram;
mod voice;

use api::{create_router, AppState};
use audio::FfmpegTranscoder;
use config::{Config, InboundMode};
use llm::{LoggingProvider, OpenAIService};
use runtime::{
    AudioTranscoder, ChatPlatform, CompletionProvider, Dispatcher, Poller, SharedDispatcher,
};
use std::sync::Arc;
use telegram::TelegramClient;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shadow=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env()?;

    // Telegram client
    let mut telegram = TelegramClient::new(config.telegram_token.clone())?
        .with_parse_mode(config.parse_mode.clone());
    if let Some(base) = &config.telegram_api_base {
        telegram = telegram.with_base_url(base.clone());
    }
    let telegram = Arc::new(telegram);

    // Completion provider
    let openai = OpenAIService::new(
        config.openai_api_key.clone(),
        config.openai_base_url.as_deref(),
        config.transcription.clone(),
        config.request_timeout,
    )?;
    let provider = LoggingProvider::new(Arc::new(openai));

    // Voice transcoder
    let transcoder = match &config.ffmpeg {
        Some(path) => FfmpegTranscoder::new(path.clone()),
        None => FfmpegTranscoder::locate(),
    }
    .with_scratch_dir(config.scratch_dir.clone())
    .with_timeout(config.request_timeout);

    tracing::info!(
        model = %config.dispatch.model,
        prompts = config.dispatch.system_prompts.len(),
        explicit_start = config.dispatch.require_explicit_start,
        ffmpeg = %transcoder.program().display(),
        "Dispatcher configured"
    );

    let dispatcher: Arc<SharedDispatcher> = Arc::new(Dispatcher::new(
        Arc::clone(&telegram) as Arc<dyn ChatPlatform>,
        Arc::new(provider) as Arc<dyn CompletionProvider>,
        Arc::new(transcoder) as Arc<dyn AudioTranscoder>,
        config.dispatch.clone(),
    ));

    match config.mode {
        InboundMode::Webhook => {
            if let Some(url) = &config.webhook_url {
                telegram.set_webhook(url).await?;
            }

            let app = create_router(AppState::new(dispatcher)).layer(TraceLayer::new_for_http());

            let addr = config.listen_addr();
            tracing::info!("Shadow listening on {}", addr);

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        InboundMode::Polling => {
            // getUpdates is refused while a webhook is set
            telegram.delete_webhook().await?;

            let cancel = CancellationToken::new();
            let poller = Poller::new(Arc::clone(&telegram), dispatcher);
            let task = tokio::spawn(poller.run(cancel.clone()));

            shutdown_signal().await;
            cancel.cancel();
            task.await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
