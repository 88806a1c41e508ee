//! Widget Client
//!
//! Thin wrapper around the widget controller for TUI integration. The
//! controller is embedded directly (no network) and driven from the TUI's
//! frame loop: events go in through [`WidgetClient::send`], and every frame
//! [`WidgetClient::poll`] lets the controller catch up on engine progress,
//! streamed chunks, placeholder frames and timers.

use std::time::Instant;

use tokio::sync::mpsc;

use widget_core::{
    AnalyticsSink, ContentStore, ControllerConfig, HttpAnalytics, NoopAnalytics, OllamaRuntime,
    WidgetController, WidgetEvent, WidgetMessage, WidgetSettings,
};

/// Controller as the terminal surface runs it
pub type TerminalController = WidgetController<OllamaRuntime, Box<dyn AnalyticsSink>>;

/// Messages buffered between frames
const MESSAGE_CAPACITY: usize = 1024;

/// Client for driving the embedded widget controller
pub struct WidgetClient {
    controller: TerminalController,
    rx: mpsc::Receiver<WidgetMessage>,
}

impl WidgetClient {
    /// Build the controller from resolved settings and the content directory
    pub fn new(settings: &WidgetSettings) -> Self {
        let (tx, rx) = mpsc::channel(MESSAGE_CAPACITY);

        let runtime = OllamaRuntime::new(settings.runtime_host.clone(), settings.runtime_port);
        let analytics: Box<dyn AnalyticsSink> = match &settings.analytics_url {
            Some(url) => Box::new(HttpAnalytics::new(url.clone())),
            None => Box::new(NoopAnalytics),
        };

        let content = ContentStore::load(&settings.data_dir);
        let config = ControllerConfig::from_content(&content, settings);
        tracing::info!(
            model = %config.model_id,
            prompts = config.placeholder_prompts.len(),
            analytics = settings.analytics_url.is_some(),
            "Widget client configured"
        );

        Self {
            controller: WidgetController::new(runtime, analytics, config, tx),
            rx,
        }
    }

    /// Publish initial state and begin loading the model
    pub async fn start(&mut self) {
        self.controller.start().await;
    }

    /// Forward one surface event
    pub async fn send(&mut self, event: WidgetEvent) {
        self.controller.handle_event(event).await;
    }

    /// Let the controller catch up (must be called every frame)
    ///
    /// Returns true if anything happened.
    pub async fn poll(&mut self) -> bool {
        let engine = self.controller.poll_engine().await;
        let streaming = self.controller.poll_streaming().await;
        let placeholder = self.controller.poll_placeholder().await;
        self.controller.tick(Instant::now()).await;
        engine || streaming || placeholder
    }

    /// Receive all pending messages (non-blocking)
    pub fn recv_all(&mut self) -> Vec<WidgetMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }
}
