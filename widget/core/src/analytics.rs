//! Analytics Sink
//!
//! Fire-and-forget logging of questions and chat outcomes to the portfolio
//! API. Failures are reported to the caller as errors, but the controller
//! only ever logs them: analytics never affects what the visitor sees.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How a chat interaction ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatOutcome {
    /// Streamed to completion
    Success,
    /// Engine failed to load, or the stream failed
    Error,
    /// No usable accelerator
    Unsupported,
}

/// One question/answer pair for the chat log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLogRecord {
    /// The visitor's question
    pub question: String,
    /// What was shown as the answer
    pub response: String,
    /// How it ended
    pub status: ChatOutcome,
}

impl ChatLogRecord {
    /// Create a record
    pub fn new(question: impl Into<String>, response: impl Into<String>, status: ChatOutcome) -> Self {
        Self {
            question: question.into(),
            response: response.into(),
            status,
        }
    }
}

/// Reply shape shared by every logging endpoint
#[derive(Debug, Deserialize)]
struct EndpointReply {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Destination for widget analytics
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// Record a submitted question (before any answer exists)
    async fn record_question(&self, question: &str) -> anyhow::Result<()>;

    /// Record how a chat interaction ended
    async fn log_chat(&self, record: &ChatLogRecord) -> anyhow::Result<()>;

    /// Drop the stored question log
    async fn clear_history(&self) -> anyhow::Result<()>;
}

/// Sink that discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopAnalytics;

#[async_trait]
impl AnalyticsSink for NoopAnalytics {
    async fn record_question(&self, _question: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn log_chat(&self, _record: &ChatLogRecord) -> anyhow::Result<()> {
        Ok(())
    }

    async fn clear_history(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl AnalyticsSink for Box<dyn AnalyticsSink> {
    async fn record_question(&self, question: &str) -> anyhow::Result<()> {
        (**self).record_question(question).await
    }

    async fn log_chat(&self, record: &ChatLogRecord) -> anyhow::Result<()> {
        (**self).log_chat(record).await
    }

    async fn clear_history(&self) -> anyhow::Result<()> {
        (**self).clear_history().await
    }
}

/// Sink posting JSON to the portfolio API
#[derive(Clone, Debug)]
pub struct HttpAnalytics {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpAnalytics {
    /// Create a sink for the API rooted at `base_url` (e.g. `http://host/api`)
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.base_url)
    }

    async fn post(&self, name: &str, body: serde_json::Value) -> anyhow::Result<()> {
        let response = self
            .http_client
            .post(self.endpoint(name))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("{name} returned {}", response.status());
        }

        let reply: EndpointReply = response.json().await?;
        if !reply.success {
            anyhow::bail!(
                "{name} rejected: {}",
                reply.message.unwrap_or_else(|| "no message".to_string())
            );
        }
        Ok(())
    }
}

#[async_trait]
impl AnalyticsSink for HttpAnalytics {
    async fn record_question(&self, question: &str) -> anyhow::Result<()> {
        self.post("save_input", serde_json::json!({ "userInput": question }))
            .await
    }

    async fn log_chat(&self, record: &ChatLogRecord) -> anyhow::Result<()> {
        self.post("log_chat", serde_json::to_value(record)?).await
    }

    async fn clear_history(&self) -> anyhow::Result<()> {
        self.post("clear_inputs", serde_json::json!({})).await
    }
}
