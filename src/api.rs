//! HTTP surface: the Telegram webhook plus health and version endpoints

mod handlers;
mod types;

pub use handlers::create_router;

use crate::runtime::SharedDispatcher;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<SharedDispatcher>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(dispatcher: Arc<SharedDispatcher>) -> Self {
        Self {
            dispatcher,
            started_at: Utc::now(),
        }
    }
}
