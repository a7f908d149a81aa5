// ── Keepsake Engine ────────────────────────────────────────────────────────
// Retrieval orchestration and its collaborators. The orchestrator is the
// core; everything else is a client or store it talks to.

pub mod classify;
pub mod config;
pub mod generate;
pub mod images;
pub mod ingest;
pub mod orchestrator;
pub mod privacy;
pub mod store;
pub mod vector;
