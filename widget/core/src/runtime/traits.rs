//! Inference Runtime Traits
//!
//! The seam between the engine adapter and whatever actually runs the model.
//! Implementations handle provider details (HTTP APIs, accelerator probing,
//! model download formats); the adapter only sees this contract.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::session::ConversationTurn;

/// Token stream events from a runtime
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamingToken {
    /// A chunk of the response
    Token(String),
    /// Response finished successfully
    Complete,
    /// Generation failed mid-flight
    Error(String),
}

/// A streaming chat request
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,
    /// Full conversation, including the newest user turn
    pub messages: Vec<ConversationTurn>,
    /// Sampling temperature
    pub temperature: f32,
}

impl ChatRequest {
    /// Create a new request
    pub fn new(model: impl Into<String>, messages: Vec<ConversationTurn>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: 0.2,
        }
    }

    /// Set temperature (clamped to 0.0-2.0)
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }
}

/// On-device language model runtime
#[async_trait]
pub trait InferenceRuntime: Send + Sync {
    /// Runtime name (e.g. "Ollama")
    fn name(&self) -> &str;

    /// Probe for the acceleration API
    ///
    /// `Ok(None)` means the API is absent; `Ok(Some(info))` carries a short
    /// description of what was found.
    async fn detect_accelerator(&self) -> anyhow::Result<Option<String>>;

    /// Try to acquire a compute device (`Ok(false)` = none available)
    async fn request_device(&self) -> anyhow::Result<bool>;

    /// Fetch and prepare `model_id`, sending free-form status lines to `progress`
    async fn load(&self, model_id: &str, progress: mpsc::Sender<String>) -> anyhow::Result<()>;

    /// Start a streaming chat completion
    ///
    /// The channel closes after `Complete` or `Error`. Dropping the receiver
    /// stops generation.
    async fn stream_chat(
        &self,
        request: &ChatRequest,
    ) -> anyhow::Result<mpsc::Receiver<StreamingToken>>;

    /// Release the loaded model
    async fn unload(&self) -> anyhow::Result<()>;
}
