//! Ollama Runtime Implementation
//!
//! Runs the model on a local Ollama server, which owns the accelerator.
//!
//! # Ollama API
//!
//! - `/api/version` - reachability (the "acceleration API")
//! - `/api/tags` - local models (the "compute device" answering)
//! - `/api/pull` - streaming model download with byte progress
//! - `/api/generate` - empty prompt loads a model, `keep_alive: 0` unloads it
//! - `/api/chat` - streaming chat completion over the full message list

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use futures::StreamExt;
use tokio::sync::mpsc;

use super::traits::{ChatRequest, InferenceRuntime, StreamingToken};

/// Ollama runtime client
#[derive(Clone)]
pub struct OllamaRuntime {
    /// Host address
    host: String,
    /// Port number
    port: u16,
    /// HTTP client
    http_client: reqwest::Client,
    /// Model held in memory, if any
    loaded_model: Arc<Mutex<Option<String>>>,
}

impl OllamaRuntime {
    /// Create a new Ollama runtime client
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            // No overall timeout: pulls and long answers stream for minutes
            http_client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            loaded_model: Arc::new(Mutex::new(None)),
        }
    }

    /// Create from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let host = std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port: u16 = std::env::var("OLLAMA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(11434);

        Self::new(host, port)
    }

    /// Get the base URL
    fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url())
    }
}

impl Default for OllamaRuntime {
    fn default() -> Self {
        Self::new("localhost", 11434)
    }
}

/// Turn one `/api/pull` status line into a progress text
fn pull_status_text(data: &serde_json::Value) -> Option<String> {
    let status = data.get("status").and_then(|s| s.as_str())?;
    let total = data.get("total").and_then(serde_json::Value::as_u64);
    let completed = data.get("completed").and_then(serde_json::Value::as_u64);

    match (total, completed) {
        (Some(total), Some(completed)) if total > 0 => {
            let percent = completed as f64 / total as f64 * 100.0;
            Some(format!("Fetching model... {percent:.1}%"))
        }
        _ => Some(format!("Fetching model: {status}")),
    }
}

/// Split complete newline-delimited JSON values off the front of `buffer`
///
/// Works on raw bytes so a character split across two HTTP chunks is only
/// decoded once its line is complete.
fn drain_ndjson(buffer: &mut Vec<u8>) -> Vec<serde_json::Value> {
    let mut values = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_slice::<serde_json::Value>(line) {
            Ok(value) => values.push(value),
            Err(e) => tracing::debug!(error = %e, "Skipping malformed NDJSON line"),
        }
    }
    values
}

#[async_trait]
impl InferenceRuntime for OllamaRuntime {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn detect_accelerator(&self) -> anyhow::Result<Option<String>> {
        let response = match self
            .http_client
            .get(self.url("version"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if !response.status().is_success() {
            return Ok(None);
        }

        let data: serde_json::Value = response.json().await?;
        let version = data
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        Ok(Some(format!("Ollama {version}")))
    }

    async fn request_device(&self) -> anyhow::Result<bool> {
        let response = self
            .http_client
            .get(self.url("tags"))
            .timeout(Duration::from_secs(10))
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    async fn load(&self, model_id: &str, progress: mpsc::Sender<String>) -> anyhow::Result<()> {
        let _ = progress.send("Fetching model manifest".to_string()).await;

        let response = self
            .http_client
            .post(self.url("pull"))
            .json(&serde_json::json!({ "model": model_id, "stream": true }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama pull returned {status}: {body}");
        }

        let mut stream = response.bytes_stream();
        let mut buffer = Vec::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
            for data in drain_ndjson(&mut buffer) {
                if let Some(error) = data.get("error").and_then(|e| e.as_str()) {
                    anyhow::bail!("Ollama pull failed: {error}");
                }
                if let Some(text) = pull_status_text(&data) {
                    let _ = progress.send(text).await;
                }
            }
        }

        let _ = progress.send("Loading model into memory".to_string()).await;

        let response = self
            .http_client
            .post(self.url("generate"))
            .json(&serde_json::json!({ "model": model_id, "prompt": "", "stream": false }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama load returned {status}: {body}");
        }

        *self.loaded_model.lock() = Some(model_id.to_string());
        let _ = progress.send("Initializing chat session".to_string()).await;
        Ok(())
    }

    async fn stream_chat(
        &self,
        request: &ChatRequest,
    ) -> anyhow::Result<mpsc::Receiver<StreamingToken>> {
        let (tx, rx) = mpsc::channel(100);

        let json_request = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "stream": true,
            "options": { "temperature": request.temperature },
        });

        let response = self
            .http_client
            .post(self.url("chat"))
            .json(&json_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama returned {status}: {body}");
        }

        let mut stream = response.bytes_stream();

        tokio::spawn(async move {
            let mut buffer = Vec::new();

            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(bytes) => {
                        buffer.extend_from_slice(&bytes);

                        for data in drain_ndjson(&mut buffer) {
                            if let Some(error) = data.get("error").and_then(|e| e.as_str()) {
                                let _ = tx.send(StreamingToken::Error(error.to_string())).await;
                                return;
                            }

                            let content = data
                                .get("message")
                                .and_then(|m| m.get("content"))
                                .and_then(|c| c.as_str())
                                .unwrap_or("");
                            if !content.is_empty()
                                && tx
                                    .send(StreamingToken::Token(content.to_string()))
                                    .await
                                    .is_err()
                            {
                                // Receiver dropped, stop streaming
                                return;
                            }

                            if data
                                .get("done")
                                .and_then(serde_json::Value::as_bool)
                                .unwrap_or(false)
                            {
                                let _ = tx.send(StreamingToken::Complete).await;
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(StreamingToken::Error(e.to_string())).await;
                        return;
                    }
                }
            }

            let _ = tx
                .send(StreamingToken::Error(
                    "stream ended without a done marker".to_string(),
                ))
                .await;
        });

        Ok(rx)
    }

    async fn unload(&self) -> anyhow::Result<()> {
        let Some(model) = self.loaded_model.lock().take() else {
            return Ok(());
        };

        // keep_alive 0 evicts the model immediately
        let response = self
            .http_client
            .post(self.url("generate"))
            .json(&serde_json::json!({ "model": model, "keep_alive": 0 }))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Ollama unload returned {}", response.status());
        }
        Ok(())
    }
}
