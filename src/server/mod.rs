// ── Keepsake Server ────────────────────────────────────────────────────────
// Axum HTTP surface. Routes:
//   POST /api/chat       — patient question → bounded answer text
//   POST /api/upload     — caregiver memory (text + optional photo)
//   GET  /api/memories   — recent records for the caregiver view
//   GET  /images/{name}  — stored photos
//
// The chat boundary absorbs every failure: the caller renders/speaks the
// body directly to a vulnerable end user, so it gets either a real answer
// (200) or the fixed failure sentence (500) — never raw error detail.

pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::engine::images::ImageStore;
use crate::engine::orchestrator::Orchestrator;
use crate::engine::store::MemoryStore;

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub store: Arc<MemoryStore>,
    pub images: ImageStore,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(routes::chat))
        .route("/api/upload", post(routes::upload))
        .route("/api/memories", get(routes::memories))
        .route("/images/:name", get(routes::image))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
