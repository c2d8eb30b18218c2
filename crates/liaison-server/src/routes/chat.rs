use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use liaison::errors::AgentError;
use liaison::models::message::Message;
use liaison::models::role::Role;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// Types matching the chat widget's JSON
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<HistoryMessage>,
}

#[derive(Debug, Deserialize)]
struct HistoryMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub reply: String,
}

/// Keep only the user and assistant turns; the widget never sends tool traffic
fn convert_history(history: &[HistoryMessage]) -> Vec<Message> {
    history
        .iter()
        .filter_map(|m| match m.role.parse::<Role>() {
            Ok(Role::User) => Some(Message::user().with_text(&m.content)),
            Ok(Role::Assistant) => Some(Message::assistant().with_text(&m.content)),
            _ => {
                tracing::debug!(role = %m.role, "Skipping history message");
                None
            }
        })
        .collect()
}

fn error_status(error: &AgentError) -> StatusCode {
    match error {
        AgentError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        AgentError::Provider(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<Value>)> {
    let history = convert_history(&request.history);
    tracing::info!(history = history.len(), "Chat request");

    match state.agent.respond(&history, &request.message).await {
        Ok(reply) => Ok(Json(ChatResponse { reply })),
        Err(e) => {
            tracing::error!(error = %e, "Chat turn failed");
            Err((error_status(&e), Json(json!({"error": e.to_string()}))))
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .with_state(state)
}
