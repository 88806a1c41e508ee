//! Widget Controller
//!
//! The headless core of the chat widget. Surfaces send [`WidgetEvent`]s up
//! and render the [`WidgetMessage`]s that come back down; every decision
//! (when to expand, what a submit does in each engine state, when the
//! panel collapses) is made here.
//!
//! # Design Philosophy
//!
//! - The controller owns [`UiState`] and the queued message. The engine
//!   adapter owns engine status and history; the controller mirrors the
//!   status from [`EngineEvent`]s and never writes it.
//! - Each engine status has exactly one fixed user-facing string. Raw error
//!   text goes to the log, never to a bubble.
//! - At most one answer streams at a time. Closing the panel drops the
//!   stream, so nothing writes into a panel that is going away.
//!
//! # Driving the controller
//!
//! Either call [`WidgetController::run`], or drive it by hand with
//! [`handle_event`](WidgetController::handle_event),
//! [`poll_engine`](WidgetController::poll_engine),
//! [`poll_streaming`](WidgetController::poll_streaming) and
//! [`tick`](WidgetController::tick).

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{FutureExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::analytics::{AnalyticsSink, ChatLogRecord, ChatOutcome};
use crate::config::WidgetSettings;
use crate::content::ContentStore;
use crate::engine::{ChatStream, EngineAdapter, EngineError, InitOptions};
use crate::events::{EngineEvent, ProgressReport, WidgetEvent};
use crate::messages::{DisplayId, DisplayRole, EngineStatus, WidgetMessage};
use crate::rotator::{PlaceholderFrame, PlaceholderRotator, RotatorStyle};
use crate::runtime::InferenceRuntime;
use crate::state::{transition, UiState, UiTrigger};

// =============================================================================
// Fixed strings
// =============================================================================

/// Shown instead of an answer when no accelerator is available
pub const UNSUPPORTED_MESSAGE: &str =
    "Sorry, this device can't run the on-device AI. A supported GPU runtime is required.";

/// Shown instead of an answer when the model failed to load
pub const LOAD_ERROR_MESSAGE: &str =
    "Sorry, there was an error loading the AI. Please restart and try again.";

/// Shown in a queued answer's bubble until the model is ready
pub const STILL_LOADING_MESSAGE: &str = "AI is still loading... I'll answer once ready.";

/// Shown in a queued answer's bubble while an earlier answer streams
pub const WAITING_MESSAGE: &str = "One moment... I'll answer right after this.";

/// Replaces an answer whose stream failed
pub const STREAM_ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Placeholder while the chat panel is open
pub const STATIC_PLACEHOLDER: &str = "Type a message...";

/// Status line text for an engine status
#[must_use]
pub fn status_text(status: EngineStatus) -> &'static str {
    match status {
        EngineStatus::Checking => "Checking compatibility...",
        EngineStatus::Loading => "Loading AI model...",
        EngineStatus::Ready => "AI Ready",
        EngineStatus::Error => "Failed to load AI",
        EngineStatus::Unsupported => "Accelerator not supported",
    }
}

/// Status line text while loading, simplified from the raw progress text
#[must_use]
pub fn loading_text(report: &ProgressReport) -> &'static str {
    if report.text.contains("Fetching") {
        "Downloading model..."
    } else if report.text.contains("Loading") {
        "Loading model..."
    } else if report.percent > 80 {
        "Almost ready..."
    } else {
        status_text(EngineStatus::Loading)
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Everything the controller needs to know up front
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Model to load
    pub model_id: String,
    /// Fully built system prompt
    pub system_prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Model load ceiling
    pub load_timeout: Duration,
    /// Closing animation window
    pub closing_window: Duration,
    /// Blur grace period
    pub blur_debounce: Duration,
    /// Clear the stored question log when the chat closes
    pub clear_log_on_close: bool,
    /// "Learn more" link target
    pub learn_more_url: Option<String>,
    /// Placeholder suggestions
    pub placeholder_prompts: Vec<String>,
    /// Placeholder rotation style
    pub rotator: RotatorStyle,
}

impl ControllerConfig {
    /// Combine loaded content with settings
    pub fn from_content(content: &ContentStore, settings: &WidgetSettings) -> Self {
        Self {
            model_id: content.model_id().to_string(),
            system_prompt: content.system_prompt(),
            temperature: content.temperature(),
            load_timeout: settings.load_timeout,
            closing_window: settings.closing_window,
            blur_debounce: settings.blur_debounce,
            clear_log_on_close: settings.clear_log_on_close,
            learn_more_url: content.blog_url().map(str::to_string),
            placeholder_prompts: content.placeholder_prompts(),
            rotator: settings.rotator,
        }
    }

    fn init_options(&self) -> InitOptions {
        InitOptions::new(self.model_id.clone(), self.system_prompt.clone())
            .with_temperature(self.temperature)
            .with_load_timeout(self.load_timeout)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from_content(&ContentStore::default(), &WidgetSettings::default())
    }
}

// =============================================================================
// Controller
// =============================================================================

/// A question held back until it can be answered
#[derive(Clone, Debug)]
struct QueuedMessage {
    question: String,
    placeholder: DisplayId,
}

/// The answer currently streaming
struct ActiveStream {
    question: String,
    placeholder: DisplayId,
    stream: ChatStream,
    response: String,
}

/// The widget controller
pub struct WidgetController<R: InferenceRuntime + 'static, A: AnalyticsSink + 'static> {
    /// Configuration
    config: ControllerConfig,
    /// Engine handle
    adapter: EngineAdapter<R>,
    /// Analytics destination
    analytics: Arc<A>,
    /// Placeholder rotation
    rotator: PlaceholderRotator,
    /// Frames published by the rotator
    placeholder_rx: watch::Receiver<PlaceholderFrame>,
    /// Channel to the surface
    tx: mpsc::Sender<WidgetMessage>,
    /// Engine events (sender cloned into the init task)
    engine_tx: mpsc::Sender<EngineEvent>,
    engine_rx: mpsc::Receiver<EngineEvent>,
    /// Init task, while running
    init_task: Option<JoinHandle<bool>>,
    /// Interactive phase
    ui_state: UiState,
    /// Engine status as last reported by the adapter
    engine_status: EngineStatus,
    /// Current input text
    input: String,
    /// At most one question waiting
    queued: Option<QueuedMessage>,
    /// At most one answer streaming
    active: Option<ActiveStream>,
    /// When an unanswered blur collapses the input
    blur_deadline: Option<Instant>,
    /// When the closing panel collapses
    closing_deadline: Option<Instant>,
}

impl<R: InferenceRuntime + 'static, A: AnalyticsSink + 'static> WidgetController<R, A> {
    /// Create a controller; nothing happens until [`start`](Self::start)
    pub fn new(
        runtime: R,
        analytics: A,
        config: ControllerConfig,
        tx: mpsc::Sender<WidgetMessage>,
    ) -> Self {
        let rotator = PlaceholderRotator::new(config.placeholder_prompts.clone(), config.rotator);
        let placeholder_rx = rotator.subscribe();
        let (engine_tx, engine_rx) = mpsc::channel(64);

        Self {
            config,
            adapter: EngineAdapter::new(runtime),
            analytics: Arc::new(analytics),
            rotator,
            placeholder_rx,
            tx,
            engine_tx,
            engine_rx,
            init_task: None,
            ui_state: UiState::default(),
            engine_status: EngineStatus::default(),
            input: String::new(),
            queued: None,
            active: None,
            blur_deadline: None,
            closing_deadline: None,
        }
    }

    /// Current interactive phase
    pub fn ui_state(&self) -> UiState {
        self.ui_state
    }

    /// Engine status as the controller last saw it
    pub fn engine_status(&self) -> EngineStatus {
        self.engine_status
    }

    /// Current input text
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The engine handle
    pub fn adapter(&self) -> &EngineAdapter<R> {
        &self.adapter
    }

    /// Question waiting for the engine, if any
    pub fn queued_question(&self) -> Option<&str> {
        self.queued.as_ref().map(|q| q.question.as_str())
    }

    /// Whether an answer is streaming
    pub fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the placeholder is rotating
    pub fn is_rotating(&self) -> bool {
        self.rotator.is_running()
    }

    /// Announce the initial state, start the rotator and begin loading
    pub async fn start(&mut self) {
        if self.init_task.is_some() {
            return;
        }

        self.send(WidgetMessage::UiState {
            state: self.ui_state,
        })
        .await;
        self.send_status().await;
        self.send(WidgetMessage::Progress { percent: 0 }).await;
        self.send(WidgetMessage::SendEnabled { enabled: false }).await;
        if let Some(url) = self.config.learn_more_url.clone() {
            self.send(WidgetMessage::LearnMoreLink { url }).await;
        }

        self.rotator.start();

        let adapter = self.adapter.clone();
        let options = self.config.init_options();
        let events = self.engine_tx.clone();
        self.init_task = Some(tokio::spawn(async move { adapter.init(options, events).await }));

        tracing::info!(model = %self.config.model_id, "Widget controller started");
    }

    // =========================================================================
    // Surface events
    // =========================================================================

    /// Handle an event from the surface
    pub async fn handle_event(&mut self, event: WidgetEvent) {
        tracing::trace!(?event, "Widget event");
        match event {
            WidgetEvent::Focus => {
                self.blur_deadline = None;
                self.apply(UiTrigger::Focus).await;
            }
            WidgetEvent::Blur => {
                if self.ui_state == UiState::Focused {
                    self.blur_deadline = Some(Instant::now() + self.config.blur_debounce);
                }
            }
            WidgetEvent::InputChanged { text } => {
                self.input = text;
                self.send_enabled().await;
            }
            WidgetEvent::Submit => self.handle_submit().await,
            WidgetEvent::OutsideClick => match self.ui_state {
                UiState::ChatOpen | UiState::Focused => self.apply(UiTrigger::OutsideClick).await,
                UiState::Collapsed | UiState::Closing => {}
            },
            WidgetEvent::Close => self.apply(UiTrigger::Close).await,
            WidgetEvent::Quit => self.shutdown().await,
        }
    }

    async fn handle_submit(&mut self) {
        let question = self.input.trim().to_string();
        if question.is_empty() {
            return;
        }
        if transition(self.ui_state, UiTrigger::Submit).is_none() {
            tracing::debug!(state = ?self.ui_state, "Submit ignored");
            return;
        }

        self.input.clear();
        self.blur_deadline = None;
        self.send(WidgetMessage::ClearInput).await;
        self.send_enabled().await;
        self.apply(UiTrigger::Submit).await;

        self.send(WidgetMessage::AppendMessage {
            id: DisplayId::new(),
            role: DisplayRole::User,
            content: question.clone(),
        })
        .await;
        self.record_question(&question);

        let placeholder = DisplayId::new();
        self.send(WidgetMessage::AppendMessage {
            id: placeholder.clone(),
            role: DisplayRole::Ai,
            content: String::new(),
        })
        .await;
        self.send(WidgetMessage::ScrollToBottom).await;

        match self.engine_status {
            EngineStatus::Unsupported | EngineStatus::Error => {
                self.answer_unavailable(question, placeholder).await;
            }
            EngineStatus::Checking | EngineStatus::Loading => {
                self.set_text(&placeholder, STILL_LOADING_MESSAGE).await;
                self.enqueue(question, placeholder);
            }
            EngineStatus::Ready if self.active.is_some() => {
                self.set_text(&placeholder, WAITING_MESSAGE).await;
                self.enqueue(question, placeholder);
            }
            EngineStatus::Ready => self.process_message(question, placeholder).await,
        }
    }

    fn enqueue(&mut self, question: String, placeholder: DisplayId) {
        if let Some(previous) = self.queued.replace(QueuedMessage {
            question,
            placeholder,
        }) {
            // Its bubble keeps whatever it shows now
            tracing::debug!(question = %previous.question, "Queued question overwritten");
        }
    }

    /// Fill a bubble with the fixed string for a terminal engine status
    async fn answer_unavailable(&mut self, question: String, placeholder: DisplayId) {
        let (text, outcome) = if self.engine_status == EngineStatus::Unsupported {
            (UNSUPPORTED_MESSAGE, ChatOutcome::Unsupported)
        } else {
            (LOAD_ERROR_MESSAGE, ChatOutcome::Error)
        };
        self.set_text(&placeholder, text).await;
        self.log_chat(ChatLogRecord::new(question, text, outcome));
    }

    /// Start streaming an answer into `placeholder`
    async fn process_message(&mut self, question: String, placeholder: DisplayId) {
        self.set_text(&placeholder, "").await;

        match self.adapter.chat(&question).await {
            Ok(stream) => {
                tracing::debug!(question = %question, "Streaming answer");
                self.active = Some(ActiveStream {
                    question,
                    placeholder,
                    stream,
                    response: String::new(),
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                self.set_text(&placeholder, STREAM_ERROR_MESSAGE).await;
                self.log_chat(ChatLogRecord::new(question, STREAM_ERROR_MESSAGE, ChatOutcome::Error));
            }
        }
    }

    // =========================================================================
    // Engine events
    // =========================================================================

    /// Handle everything the engine has reported so far
    ///
    /// Returns true if any event was processed.
    pub async fn poll_engine(&mut self) -> bool {
        let mut handled = false;
        while let Ok(event) = self.engine_rx.try_recv() {
            self.handle_engine_event(event).await;
            handled = true;
        }
        handled
    }

    /// Wait for the next engine event and handle it
    pub async fn recv_engine_event(&mut self) -> Option<EngineEvent> {
        let event = self.engine_rx.recv().await?;
        self.handle_engine_event(event.clone()).await;
        Some(event)
    }

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Loading => {
                self.engine_status = EngineStatus::Loading;
                self.send_status().await;
                self.send(WidgetMessage::Progress { percent: 0 }).await;
            }
            EngineEvent::Progress(report) => {
                self.send(WidgetMessage::Progress {
                    percent: report.percent,
                })
                .await;
                if self.engine_status == EngineStatus::Loading {
                    self.send(WidgetMessage::EngineStatus {
                        status: EngineStatus::Loading,
                        text: loading_text(&report).to_string(),
                    })
                    .await;
                }
            }
            EngineEvent::Ready => {
                self.engine_status = EngineStatus::Ready;
                self.send_status().await;
                self.send(WidgetMessage::Progress { percent: 100 }).await;
                self.replay_queued().await;
            }
            EngineEvent::Unsupported { reason } => {
                tracing::warn!(reason = %reason, "On-device AI unavailable");
                self.engine_status = EngineStatus::Unsupported;
                self.fail_queued().await;
            }
            EngineEvent::Failed { error } => {
                tracing::error!(error = %error, "On-device AI failed to load");
                self.engine_status = EngineStatus::Error;
                self.fail_queued().await;
            }
        }
    }

    async fn replay_queued(&mut self) {
        if self.active.is_some() || self.engine_status != EngineStatus::Ready {
            return;
        }
        if let Some(queued) = self.queued.take() {
            tracing::debug!(question = %queued.question, "Replaying queued question");
            self.process_message(queued.question, queued.placeholder).await;
        }
    }

    async fn fail_queued(&mut self) {
        self.send_status().await;
        if let Some(queued) = self.queued.take() {
            self.answer_unavailable(queued.question, queued.placeholder)
                .await;
        }
    }

    // =========================================================================
    // Streaming
    // =========================================================================

    /// Apply every chunk already available without waiting
    ///
    /// Returns true if anything was applied.
    pub async fn poll_streaming(&mut self) -> bool {
        let mut progressed = false;
        loop {
            let Some(active) = self.active.as_mut() else {
                return progressed;
            };
            let Some(item) = active.stream.next().now_or_never() else {
                return progressed;
            };
            self.handle_stream_item(item).await;
            progressed = true;
        }
    }

    /// Wait for the next chunk (or the end) of the active stream
    ///
    /// Returns false when nothing is streaming.
    pub async fn recv_stream_item(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let item = active.stream.next().await;
        self.handle_stream_item(item).await;
        true
    }

    async fn handle_stream_item(&mut self, item: Option<Result<String, EngineError>>) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        match item {
            Some(Ok(chunk)) => {
                active.response.push_str(&chunk);
                let id = active.placeholder.clone();
                self.send(WidgetMessage::AppendText { id, chunk }).await;
                self.send(WidgetMessage::ScrollToBottom).await;
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Answer stream failed");
                if let Some(active) = self.active.take() {
                    self.set_text(&active.placeholder, STREAM_ERROR_MESSAGE).await;
                    self.log_chat(ChatLogRecord::new(
                        active.question,
                        STREAM_ERROR_MESSAGE,
                        ChatOutcome::Error,
                    ));
                }
                self.replay_queued().await;
            }
            None => {
                if let Some(active) = self.active.take() {
                    tracing::debug!(chars = active.response.len(), "Answer complete");
                    self.log_chat(ChatLogRecord::new(
                        active.question,
                        active.response,
                        ChatOutcome::Success,
                    ));
                }
                self.replay_queued().await;
            }
        }
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.blur_deadline, self.closing_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire every deadline at or before `now`
    pub async fn tick(&mut self, now: Instant) {
        if self.blur_deadline.is_some_and(|d| now >= d) {
            self.blur_deadline = None;
            if self.input.trim().is_empty() {
                self.apply(UiTrigger::BlurSettled).await;
            }
        }
        if self.closing_deadline.is_some_and(|d| now >= d) {
            self.closing_deadline = None;
            self.apply(UiTrigger::ClosingElapsed).await;
        }
    }

    // =========================================================================
    // State transitions
    // =========================================================================

    async fn apply(&mut self, trigger: UiTrigger) {
        let Some(next) = transition(self.ui_state, trigger) else {
            return;
        };
        let previous = std::mem::replace(&mut self.ui_state, next);
        if previous == next {
            return;
        }

        tracing::debug!(from = ?previous, to = ?next, ?trigger, "UI state changed");
        self.send(WidgetMessage::UiState { state: next }).await;

        match next {
            UiState::Focused => {}
            UiState::ChatOpen => {
                self.blur_deadline = None;
                self.rotator.stop(STATIC_PLACEHOLDER);
                let _ = self.placeholder_rx.borrow_and_update();
                self.send(WidgetMessage::Placeholder {
                    text: STATIC_PLACEHOLDER.to_string(),
                    fading: false,
                })
                .await;
            }
            UiState::Closing => {
                if let Some(active) = self.active.take() {
                    tracing::debug!(question = %active.question, "Cancelling answer on close");
                }
                self.queued = None;
                self.closing_deadline = Some(Instant::now() + self.config.closing_window);
                if self.config.clear_log_on_close {
                    self.clear_history();
                }
            }
            UiState::Collapsed => {
                self.blur_deadline = None;
                if previous == UiState::Closing {
                    self.send(WidgetMessage::ClearMessages).await;
                    self.adapter.reset();
                    self.rotator.start();
                }
                if !self.input.is_empty() {
                    self.input.clear();
                    self.send(WidgetMessage::ClearInput).await;
                    self.send_enabled().await;
                }
            }
        }
    }

    // =========================================================================
    // Event loop
    // =========================================================================

    /// Run until the surface quits or its channel closes
    pub async fn run(&mut self, mut events: mpsc::Receiver<WidgetEvent>) {
        self.start().await;

        loop {
            let deadline = self.next_deadline();

            tokio::select! {
                event = events.recv() => match event {
                    Some(WidgetEvent::Quit) | None => {
                        self.shutdown().await;
                        break;
                    }
                    Some(event) => self.handle_event(event).await,
                },
                Some(event) = self.engine_rx.recv() => self.handle_engine_event(event).await,
                item = next_chunk(&mut self.active) => self.handle_stream_item(item).await,
                Ok(()) = self.placeholder_rx.changed() => self.forward_placeholder().await,
                () = sleep_until(deadline) => self.tick(Instant::now()).await,
            }
        }
    }

    /// Forward a new rotator frame, if there is one
    ///
    /// Returns true if a frame was pending.
    pub async fn poll_placeholder(&mut self) -> bool {
        if !self.placeholder_rx.has_changed().unwrap_or(false) {
            return false;
        }
        self.forward_placeholder().await;
        true
    }

    async fn forward_placeholder(&mut self) {
        let frame = self.placeholder_rx.borrow_and_update().clone();
        if self.ui_state.flags().rotating_placeholder {
            self.send(WidgetMessage::Placeholder {
                text: frame.text,
                fading: frame.fading,
            })
            .await;
        }
    }

    /// Stop everything and tell the surface to quit
    pub async fn shutdown(&mut self) {
        if let Some(task) = self.init_task.take() {
            task.abort();
        }
        self.active = None;
        self.queued = None;
        self.rotator.stop("");
        self.adapter.unload().await;
        self.send(WidgetMessage::Quit).await;
        tracing::info!("Widget controller stopped");
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn send(&self, msg: WidgetMessage) {
        if self.tx.send(msg).await.is_err() {
            tracing::debug!("Surface channel closed");
        }
    }

    async fn send_status(&self) {
        self.send(WidgetMessage::EngineStatus {
            status: self.engine_status,
            text: status_text(self.engine_status).to_string(),
        })
        .await;
    }

    async fn send_enabled(&self) {
        self.send(WidgetMessage::SendEnabled {
            enabled: !self.input.trim().is_empty(),
        })
        .await;
    }

    async fn set_text(&self, id: &DisplayId, text: &str) {
        self.send(WidgetMessage::SetText {
            id: id.clone(),
            text: text.to_string(),
        })
        .await;
    }

    fn record_question(&self, question: &str) {
        let sink = Arc::clone(&self.analytics);
        let question = question.to_string();
        tokio::spawn(async move {
            if let Err(e) = sink.record_question(&question).await {
                tracing::debug!(error = %e, "Question log failed");
            }
        });
    }

    fn log_chat(&self, record: ChatLogRecord) {
        let sink = Arc::clone(&self.analytics);
        tokio::spawn(async move {
            if let Err(e) = sink.log_chat(&record).await {
                tracing::debug!(error = %e, "Chat log failed");
            }
        });
    }

    fn clear_history(&self) {
        let sink = Arc::clone(&self.analytics);
        tokio::spawn(async move {
            if let Err(e) = sink.clear_history().await {
                tracing::debug!(error = %e, "Clearing question log failed");
            }
        });
    }
}

async fn next_chunk(active: &mut Option<ActiveStream>) -> Option<Result<String, EngineError>> {
    match active {
        Some(active) => active.stream.next().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(percent: u8, text: &str) -> ProgressReport {
        ProgressReport {
            percent,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_loading_text() {
        assert_eq!(loading_text(&report(40, "Fetching model... 40%")), "Downloading model...");
        assert_eq!(loading_text(&report(30, "Loading model into memory")), "Loading model...");
        assert_eq!(loading_text(&report(85, "Initializing chat session")), "Almost ready...");
        assert_eq!(loading_text(&report(5, "warming up")), "Loading AI model...");
    }

    #[test]
    fn test_every_status_has_text() {
        for status in [
            EngineStatus::Checking,
            EngineStatus::Loading,
            EngineStatus::Ready,
            EngineStatus::Error,
            EngineStatus::Unsupported,
        ] {
            assert!(!status_text(status).is_empty());
        }
    }

    #[test]
    fn test_fixed_messages_distinct() {
        let messages = [
            UNSUPPORTED_MESSAGE,
            LOAD_ERROR_MESSAGE,
            STILL_LOADING_MESSAGE,
            WAITING_MESSAGE,
            STREAM_ERROR_MESSAGE,
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_default_config_timing() {
        let config = ControllerConfig::default();
        assert_eq!(config.closing_window, Duration::from_millis(300));
        assert_eq!(config.blur_debounce, Duration::from_millis(150));
        assert!(!config.clear_log_on_close);
    }
}
