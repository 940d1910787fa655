//! API response types

use crate::session::SessionState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Liveness report
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub started_at: DateTime<Utc>,
    /// `None` while a turn holds the session
    pub session: Option<SessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub state: SessionState,
    pub id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub model: String,
    /// System prompts seeded on every start
    pub seed_messages: usize,
    pub messages: usize,
}
