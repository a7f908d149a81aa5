// ── Keepsake Server: Route Handlers ────────────────────────────────────────

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;

use crate::atoms::constants::FAILURE_SENTENCE;
use crate::atoms::types::ChatTurn;
use crate::engine::privacy::check_privacy;

use super::AppState;

// ── POST /api/chat ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct ChatRequest {
    #[serde(default)]
    messages: Vec<ChatTurn>,
}

/// Patient chat endpoint. Body is parsed leniently — a missing message list
/// behaves as an empty question (the search finds nothing and the deferral
/// sentence comes back with a 200). Anything that actually fails becomes the
/// fixed failure sentence with a 500.
pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> (StatusCode, String) {
    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!("[chat] malformed request body: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, FAILURE_SENTENCE.to_string());
        }
    };

    match state.orchestrator.answer(&request.messages).await {
        Ok(answer) => (StatusCode::OK, answer),
        Err(e) => {
            error!("[chat] answer failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, FAILURE_SENTENCE.to_string())
        }
    }
}

// ── POST /api/upload ───────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct UploadRequest {
    #[serde(default)]
    text: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, rename = "patientId")]
    patient_id: Option<String>,
}

/// Caregiver memory submission: privacy-filter the text, persist the photo,
/// insert a pending record for the ingestion worker to pick up.
pub async fn upload(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let request: UploadRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!("[upload] malformed request body: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid request body" })),
            );
        }
    };

    let text = request.text.trim();
    if text.is_empty() && request.image.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Nothing to upload" })),
        );
    }

    let verdict = check_privacy(text);
    if verdict.triggered {
        info!("[upload] privacy filter redacted sensitive content");
    }

    let image_url = match &request.image {
        Some(data_url) => match state.images.save(data_url) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("[upload] image rejected: {e}");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Invalid image format" })),
                );
            }
        },
        None => None,
    };

    let author = match request.author.trim() {
        "" => "Caregiver",
        a => a,
    };
    let patient_id = request.patient_id.as_deref().unwrap_or("default");

    match state
        .store
        .insert(&verdict.clean_text, author, image_url.as_deref(), patient_id)
    {
        Ok(id) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "memoryId": id, "status": "pending" })),
        ),
        Err(e) => {
            error!("[upload] insert failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Upload failed" })),
            )
        }
    }
}

// ── GET /api/memories ──────────────────────────────────────────────────────

pub async fn memories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.recent(100) {
        Ok(records) => (StatusCode::OK, Json(json!({ "memories": records }))),
        Err(e) => {
            error!("[memories] list failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Listing failed" })),
            )
        }
    }
}

// ── GET /images/{name} ─────────────────────────────────────────────────────

pub async fn image(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.images.load(&name) {
        Ok(Some((mime, bytes))) => {
            ([(header::CONTENT_TYPE, mime)], bytes).into_response()
        }
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("[images] read failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
