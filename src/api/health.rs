//! Health endpoint

use serde::{Deserialize, Serialize};

use super::types::{DataEnvelope, Json};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

pub async fn root() -> Json<DataEnvelope<HealthResponse>> {
    Json(DataEnvelope::new(HealthResponse {
        status: "ok".to_string(),
        message: "kb-gateway API running".to_string(),
    }))
}
