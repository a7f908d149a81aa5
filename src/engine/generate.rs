// ── Keepsake Engine: Generative Answering Client (Gemini) ──────────────────
// Single-turn prompt-in, text-out. Each call carries the full constructed
// prompt; no conversation state survives between calls. Same failure policy
// as the vector client: one uniform upstream error, no retries.

use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde_json::{json, Value};

use crate::atoms::constants::{CONNECT_TIMEOUT_SECS, LOG_BODY_MAX, REQUEST_TIMEOUT_SECS};
use crate::atoms::error::{KeepsakeError, KeepsakeResult};
use crate::atoms::traits::AnswerGenerator;
use crate::atoms::types::truncate_utf8;

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        GeminiClient {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl AnswerGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> KeepsakeResult<String> {
        // Key travels in the query string; never log the URL.
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        info!("[generate] request model={}", self.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| KeepsakeError::upstream("gemini", 0, &format!("request failed: {e}")))?;

        let status = response.status().as_u16();
        let raw = response.text().await.unwrap_or_default();

        if !(200..300).contains(&status) {
            warn!("[generate] error {}: {}", status, truncate_utf8(&raw, LOG_BODY_MAX));
            return Err(KeepsakeError::upstream("gemini", status, &raw));
        }

        let v: Value = serde_json::from_str(&raw).map_err(|e| {
            warn!("[generate] malformed payload: {e}: {}", truncate_utf8(&raw, LOG_BODY_MAX));
            KeepsakeError::upstream("gemini", status, &format!("malformed payload: {e}"))
        })?;

        let text = extract_text(&v);
        if text.is_empty() {
            warn!("[generate] no candidate text: {}", truncate_utf8(&raw, LOG_BODY_MAX));
            return Err(KeepsakeError::upstream("gemini", status, "no candidate text in response"));
        }
        Ok(text)
    }
}

/// Join the text parts of the first candidate.
fn extract_text(v: &Value) -> String {
    let Some(parts) = v["candidates"][0]["content"]["parts"].as_array() else {
        return String::new();
    };
    parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_candidate_text() {
        let v = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Grandpa loved " }, { "text": "fishing." }] }
            }]
        });
        assert_eq!(extract_text(&v), "Grandpa loved fishing.");
    }

    #[test]
    fn missing_candidates_yield_empty() {
        assert_eq!(extract_text(&json!({})), "");
        assert_eq!(extract_text(&json!({"candidates": []})), "");
        assert_eq!(
            extract_text(&json!({"candidates": [{"content": {}}]})),
            ""
        );
    }
}
