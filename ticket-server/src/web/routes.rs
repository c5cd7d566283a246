//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;

use crate::turn::TurnReply;

use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/turn", post(turn))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// One conversation turn.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    /// Conversation identity; session state is scoped to it.
    pub conversation_id: String,

    /// The raw turn text.
    pub text: String,
}

/// Process a turn and return the structured reply.
async fn turn(State(state): State<AppState>, Json(request): Json<TurnRequest>) -> Json<TurnReply> {
    Json(
        state
            .engine
            .handle_turn(&request.conversation_id, &request.text)
            .await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Mode, PageView};

    #[test]
    fn turn_request_deserializes() {
        let request: TurnRequest = serde_json::from_str(
            r#"{"conversation_id": "room-42", "text": "high-speed Beijing Shanghai"}"#,
        )
        .unwrap();
        assert_eq!(request.conversation_id, "room-42");
        assert_eq!(request.text, "high-speed Beijing Shanghai");
    }

    #[test]
    fn reply_json_shapes() {
        let json = serde_json::to_value(TurnReply::Message {
            text: "already at the last page".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "message");
        assert_eq!(json["text"], "already at the last page");

        let json = serde_json::to_value(TurnReply::Ignored).unwrap();
        assert_eq!(json["kind"], "ignored");

        let json = serde_json::to_value(TurnReply::Results(PageView {
            records: vec![],
            page: 1,
            total_pages: 1,
            total_matches: 0,
            mode: Mode::Direct,
        }))
        .unwrap();
        assert_eq!(json["kind"], "results");
        assert_eq!(json["page"], 1);
        assert_eq!(json["mode"], "direct");
    }
}
