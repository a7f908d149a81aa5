// ── Keepsake Engine: Vector Memory Client (Moorcheh) ───────────────────────
// Two query shapes against the same namespace: ranked semantic search and
// exact metadata-filtered lookup by file id. Also carries the producer-side
// document upload used by the ingestion worker.
//
// Error policy: any non-2xx status, transport failure, or unparseable body
// is one uniform upstream failure. Nothing is retried — the patient is
// waiting, and a fast fallback sentence beats a slow answer.

use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde_json::{json, Value};

use crate::atoms::constants::{CONNECT_TIMEOUT_SECS, LOG_BODY_MAX, REQUEST_TIMEOUT_SECS};
use crate::atoms::error::{KeepsakeError, KeepsakeResult};
use crate::atoms::traits::VectorMemory;
use crate::atoms::types::{truncate_utf8, MemorySnippet};

pub struct MoorchehClient {
    client: Client,
    base_url: String,
    api_key: String,
    namespace: String,
}

impl MoorchehClient {
    pub fn new(base_url: &str, api_key: &str, namespace: &str) -> Self {
        MoorchehClient {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            namespace: namespace.to_string(),
        }
    }

    /// POST a JSON body and return the parsed response value.
    async fn post_json(&self, url: &str, body: &Value) -> KeepsakeResult<Value> {
        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| KeepsakeError::upstream("moorcheh", 0, &format!("request failed: {e}")))?;

        let status = response.status().as_u16();
        let raw = response.text().await.unwrap_or_default();

        if !(200..300).contains(&status) {
            warn!("[vector] error {}: {}", status, truncate_utf8(&raw, LOG_BODY_MAX));
            return Err(KeepsakeError::upstream("moorcheh", status, &raw));
        }

        serde_json::from_str(&raw).map_err(|e| {
            warn!("[vector] malformed payload: {e}: {}", truncate_utf8(&raw, LOG_BODY_MAX));
            KeepsakeError::upstream("moorcheh", status, &format!("malformed payload: {e}"))
        })
    }

    // ── Producer side (ingestion worker) ───────────────────────────────────

    /// Create the namespace if it does not exist yet. Failure is tolerated —
    /// the common case is that it already exists.
    pub async fn ensure_namespace(&self) {
        let url = format!("{}/namespaces", self.base_url);
        let body = json!({ "namespace_name": self.namespace, "type": "text" });
        match self.post_json(&url, &body).await {
            Ok(_) => info!("[vector] namespace {} ready", self.namespace),
            Err(e) => info!("[vector] namespace create skipped: {e}"),
        }
    }

    /// Upload memory documents into the namespace for indexing.
    pub async fn upload_documents(&self, documents: &[Value]) -> KeepsakeResult<()> {
        let url = format!("{}/namespaces/{}/documents", self.base_url, self.namespace);
        let body = json!({ "documents": documents });
        self.post_json(&url, &body).await?;
        Ok(())
    }
}

#[async_trait]
impl VectorMemory for MoorchehClient {
    async fn semantic_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> KeepsakeResult<Vec<MemorySnippet>> {
        let url = format!("{}/search", self.base_url);
        let body = json!({
            "query": query,
            "namespaces": [self.namespace],
            "top_k": top_k,
        });
        let value = self.post_json(&url, &body).await?;
        let snippets = normalize_snippets(&value);
        info!("[vector] semantic search returned {} snippet(s)", snippets.len());
        Ok(snippets)
    }

    async fn file_lookup(
        &self,
        file_id: &str,
        limit: usize,
    ) -> KeepsakeResult<Vec<MemorySnippet>> {
        // The backend requires a query string even on the filtered path; the
        // result set is used for metadata equality only, never for ranking.
        let url = format!("{}/search", self.base_url);
        let body = json!({
            "namespace": self.namespace,
            "query": file_id,
            "limit": limit,
            "metadata_filter": { "file": file_id },
        });
        let value = self.post_json(&url, &body).await?;
        let snippets = normalize_snippets(&value);
        info!("[vector] file lookup {file_id} returned {} snippet(s)", snippets.len());
        Ok(snippets)
    }
}

// ── Response normalization ─────────────────────────────────────────────────
// The backend answers with a list under `results` or under `documents`
// depending on the query shape and service version. This is the single place
// that branches on response shape; everything downstream sees MemorySnippet.

pub(crate) fn normalize_snippets(value: &Value) -> Vec<MemorySnippet> {
    let entries = value["results"]
        .as_array()
        .or_else(|| value["documents"].as_array());

    let Some(entries) = entries else {
        // Absent or non-list at both keys means zero results, not an error.
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| MemorySnippet {
            text: entry["text"].as_str().map(|s| s.to_string()),
            score: entry["score"].as_f64(),
        })
        .collect()
}
