//! Runtime for processing inbound updates
//!
//! One dispatcher owns the process-wide session. Updates reach it either
//! from the webhook handler or from the long-polling loop.

mod dispatcher;
mod policy;
mod poller;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use dispatcher::{DispatchConfig, Dispatcher, TurnError};
pub use policy::ErrorPolicy;
pub use poller::Poller;
pub use traits::*;

use std::sync::Arc;

/// Type alias for the production dispatcher with boxed collaborators
pub type SharedDispatcher = Dispatcher<
    Arc<dyn ChatPlatform>,
    Arc<dyn CompletionProvider>,
    Arc<dyn AudioTranscoder>,
>;
