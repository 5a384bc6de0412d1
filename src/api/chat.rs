//! Chat endpoint

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::domain::tasks::{KbQueryOutput, KbQueryRequest};

use super::state::AppState;
use super::types::{DataEnvelope, Json};

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatQueryRequest {
    pub kb_id: String,
    pub query: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// POST /chat/query
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<ChatQueryRequest>,
) -> Json<DataEnvelope<KbQueryOutput>> {
    let output = state
        .tasks
        .kb_query(KbQueryRequest {
            kb_id: request.kb_id,
            query: request.query,
            thread_id: request.thread_id,
        })
        .await;

    Json(DataEnvelope::new(output))
}
