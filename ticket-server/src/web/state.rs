//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedSegmentSource;
use crate::nlq::ChatClient;
use crate::provider::TicketClient;
use crate::turn::TurnEngine;

/// The concrete engine the server runs: a cached HTTP ticket source with
/// the chat-completions interpreter (when configured).
pub type Engine = TurnEngine<CachedSegmentSource<TicketClient>, ChatClient>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The turn engine behind every conversation.
    pub engine: Arc<Engine>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
