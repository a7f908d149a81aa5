// ── Keepsake Engine: Ingestion Worker ──────────────────────────────────────
// Background loop moving caregiver memories from the SQLite store into the
// vector index. Polls for pending work, uploads a batch, and advances the
// status state machine. A failing cycle logs and waits for the next poll —
// the worker never takes down the server.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use crate::atoms::error::KeepsakeResult;
use crate::atoms::types::MemoryRecord;
use crate::engine::config::Config;
use crate::engine::store::MemoryStore;
use crate::engine::vector::MoorchehClient;

pub fn spawn(
    store: Arc<MemoryStore>,
    vector: Arc<MoorchehClient>,
    config: &Config,
) -> JoinHandle<()> {
    let poll = Duration::from_secs(config.ingest_poll_secs);
    let batch_size = config.ingest_batch_size;
    let max_attempts = config.ingest_max_attempts;

    info!("[ingest] worker started, polling every {}s", poll.as_secs());

    tokio::spawn(async move {
        loop {
            if let Err(e) = run_once(&store, &vector, batch_size, max_attempts).await {
                error!("[ingest] cycle failed: {e}");
            }
            tokio::time::sleep(poll).await;
        }
    })
}

/// One ingestion cycle. Returns the number of records uploaded.
pub async fn run_once(
    store: &MemoryStore,
    vector: &MoorchehClient,
    batch_size: i64,
    max_attempts: i64,
) -> KeepsakeResult<usize> {
    let batch = store.pending_batch(batch_size, max_attempts)?;
    if batch.is_empty() {
        return Ok(0);
    }

    // Records with blank text can never be indexed; fail them immediately.
    let (blank, uploadable): (Vec<_>, Vec<_>) =
        batch.into_iter().partition(|r| r.text.trim().is_empty());
    if !blank.is_empty() {
        let ids: Vec<String> = blank.into_iter().map(|r| r.id).collect();
        store.mark_failed(&ids)?;
    }
    if uploadable.is_empty() {
        return Ok(0);
    }

    let documents: Vec<Value> = uploadable.iter().map(to_document).collect();
    let ids: Vec<String> = uploadable.into_iter().map(|r| r.id).collect();

    vector.ensure_namespace().await;

    match vector.upload_documents(&documents).await {
        Ok(()) => {
            store.mark_indexed(&ids)?;
            info!("[ingest] indexed {} memorie(s)", ids.len());
            Ok(ids.len())
        }
        Err(e) => {
            store.mark_failed(&ids)?;
            Err(e)
        }
    }
}

/// Shape a stored memory into a vector-service document. The `file` metadata
/// field is what the chat path's `#file:` lookup filters on. Absent optional
/// fields are omitted rather than sent as null.
pub fn to_document(record: &MemoryRecord) -> Value {
    let mut metadata = json!({
        "file": record.id,
        "source": "keepsake",
        "author": record.author,
        "patientId": record.patient_id,
        "createdAt": record.created_at,
    });
    if let Some(url) = &record.image_url {
        metadata["imageUrl"] = json!(url);
    }
    json!({
        "id": record.id,
        "text": record.text,
        "metadata": metadata,
    })
}
