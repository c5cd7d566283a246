//! HTTP surface for the ticket query engine.
//!
//! Thin glue: one endpoint accepts a conversation turn and returns the
//! engine's structured reply as JSON. Rendering replies to chat text is
//! the caller's concern.

mod routes;
mod state;

pub use routes::{TurnRequest, create_router};
pub use state::{AppState, Engine};
