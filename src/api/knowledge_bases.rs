//! Knowledge base endpoints

use axum::extract::{Multipart, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::tasks::{
    KbCreateOutput, KbCreateRequest, KbListOutput, KbUploadOutput, KbUploadRequest,
};

use super::state::AppState;
use super::types::{ApiError, DataEnvelope, Json};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateKnowledgeBaseRequest {
    pub kb_id: String,
}

/// GET /knowledge-bases
pub async fn list(State(state): State<AppState>) -> Json<DataEnvelope<KbListOutput>> {
    Json(DataEnvelope::new(state.tasks.kb_get().await))
}

/// POST /knowledge-bases
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateKnowledgeBaseRequest>,
) -> Json<DataEnvelope<KbCreateOutput>> {
    let output = state
        .tasks
        .kb_create(KbCreateRequest {
            kb_id: request.kb_id,
        })
        .await;

    Json(DataEnvelope::new(output))
}

/// POST /knowledge-bases/upload
///
/// Multipart form with a `kb_id` text field and a `file` field. The upload is
/// staged to disk under a collision-proof name; the task owns its removal.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DataEnvelope<KbUploadOutput>>, ApiError> {
    let mut kb_id: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart request: {}", e)))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("kb_id") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid kb_id field: {}", e)))?;
                kb_id = Some(value);
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(sanitize_file_name)
                    .unwrap_or_else(|| "upload.pdf".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid file field: {}", e)))?;
                file = Some((filename, data.to_vec()));
            }
            _ => {}
        }
    }

    let kb_id = kb_id.ok_or_else(|| ApiError::bad_request("Missing 'kb_id' field"))?;
    let (filename, data) = file.ok_or_else(|| ApiError::bad_request("Missing 'file' field"))?;

    tokio::fs::create_dir_all(&state.staging_dir)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to prepare staging directory: {}", e)))?;

    let staged_path = state
        .staging_dir
        .join(format!("{}_{}", Uuid::new_v4(), filename));

    tokio::fs::write(&staged_path, &data)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to stage upload: {}", e)))?;

    tracing::info!(kb_id = %kb_id, path = %staged_path.display(), "Staged upload");

    let output = state
        .tasks
        .kb_upload(KbUploadRequest {
            kb_id,
            file_path: staged_path.to_string_lossy().to_string(),
        })
        .await;

    Ok(Json(DataEnvelope::new(output)))
}

/// Restrict file names to characters that are safe on disk
fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        "upload.pdf".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("statement.pdf"), "statement.pdf");
        assert_eq!(sanitize_file_name("jan 2024.pdf"), "jan_2024.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("???"), "upload.pdf");
    }
}
