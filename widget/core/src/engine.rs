//! Inference Engine Adapter
//!
//! Wraps an [`InferenceRuntime`] behind the small contract the widget needs:
//! check compatibility, load once, stream answers, reset, unload.
//!
//! # Ownership
//!
//! The adapter is the only writer of [`EngineStatus`], load progress and the
//! conversation history. Everyone else holds a cloned handle and reads.
//!
//! # Streams
//!
//! [`EngineAdapter::chat`] returns a [`ChatStream`]: finite, single-consumer,
//! not restartable. At most one is active at a time. The assistant turn is
//! committed only when the runtime reports completion; an error or an early
//! drop rolls the user turn back instead, so history never holds an
//! unanswered question or a partial answer.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::events::{EngineEvent, ProgressReport};
use crate::messages::EngineStatus;
use crate::runtime::{ChatRequest, InferenceRuntime, StreamingToken};
use crate::session::{Conversation, ConversationTurn, Exchange};

/// Default ceiling on a model load
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors surfaced by the adapter
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// `chat` was called before a successful `init`
    #[error("engine is not initialized")]
    NotInitialized,
    /// Another chat stream is still active
    #[error("a chat stream is already active")]
    StreamBusy,
    /// The runtime refused to start a request
    #[error("runtime error: {0}")]
    Runtime(String),
    /// The stream failed after it started
    #[error("stream failed: {0}")]
    Stream(String),
}

/// Parameters for one initialization
#[derive(Clone, Debug)]
pub struct InitOptions {
    /// Model to load
    pub model_id: String,
    /// Seed for the system turn (empty = none)
    pub system_prompt: String,
    /// Sampling temperature for every chat
    pub temperature: f32,
    /// Give up on a load that takes longer than this
    pub load_timeout: Duration,
}

impl InitOptions {
    /// Options with the default temperature and load timeout
    pub fn new(model_id: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            system_prompt: system_prompt.into(),
            temperature: 0.2,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the load timeout
    #[must_use]
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }
}

/// Outcome of a compatibility probe
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompatibilityReport {
    /// Whether the model can run here
    pub supported: bool,
    /// Human-readable explanation
    pub reason: String,
}

impl CompatibilityReport {
    fn supported(reason: impl Into<String>) -> Self {
        Self {
            supported: true,
            reason: reason.into(),
        }
    }

    fn unsupported(reason: impl Into<String>) -> Self {
        Self {
            supported: false,
            reason: reason.into(),
        }
    }
}

/// Best-effort percent from free-form load status text
///
/// The first `N%` or `N.N%` in the text wins (capped at 99, since only a
/// finished load is 100). Without a number, known phase keywords map to
/// fixed checkpoints. Anything else is 0.
#[must_use]
pub fn parse_progress(text: &str) -> u8 {
    if let Some(value) = first_percentage(text) {
        return value.clamp(0.0, 99.0) as u8;
    }

    const PHASES: [(&str, u8); 4] = [
        ("Fetching", 10),
        ("Loading", 30),
        ("Compiling", 60),
        ("Initializing", 80),
    ];
    PHASES
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map_or(0, |&(_, percent)| percent)
}

fn first_percentage(text: &str) -> Option<f64> {
    (0..text.len()).find_map(|start| percentage_at(text, start))
}

/// Match `digits ('.' digits)? whitespace* '%'` starting exactly at `start`
fn percentage_at(text: &str, start: usize) -> Option<f64> {
    let bytes = text.as_bytes();
    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let int_len = digits(start);
    if int_len == 0 {
        return None;
    }
    let mut end = start + int_len;
    if bytes.get(end) == Some(&b'.') {
        let frac_len = digits(end + 1);
        if frac_len > 0 {
            end += 1 + frac_len;
        }
    }

    if text[end..].trim_start().starts_with('%') {
        text[start..end].parse().ok()
    } else {
        None
    }
}

/// State guarded by the adapter's lock
#[derive(Debug)]
struct EngineState {
    status: EngineStatus,
    progress: u8,
    initialized: bool,
    loading: bool,
    model_id: String,
    temperature: f32,
    conversation: Conversation,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            status: EngineStatus::Checking,
            progress: 0,
            initialized: false,
            loading: false,
            model_id: String::new(),
            temperature: 0.2,
            conversation: Conversation::default(),
        }
    }
}

type SharedState = Arc<Mutex<EngineState>>;

/// Handle to the engine (cheap to clone)
pub struct EngineAdapter<R> {
    runtime: Arc<R>,
    state: SharedState,
}

impl<R> Clone for EngineAdapter<R> {
    fn clone(&self) -> Self {
        Self {
            runtime: Arc::clone(&self.runtime),
            state: Arc::clone(&self.state),
        }
    }
}

impl<R: InferenceRuntime> EngineAdapter<R> {
    /// Wrap a runtime; nothing is loaded until [`init`](Self::init)
    pub fn new(runtime: R) -> Self {
        Self {
            runtime: Arc::new(runtime),
            state: Arc::new(Mutex::new(EngineState::default())),
        }
    }

    /// The wrapped runtime
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Current lifecycle phase
    pub fn status(&self) -> EngineStatus {
        self.state.lock().status
    }

    /// Last reported load percent
    pub fn progress(&self) -> u8 {
        self.state.lock().progress
    }

    /// Whether a model is loaded and the conversation seeded
    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    /// Whether a load is in flight
    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Snapshot of the conversation history
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.state.lock().conversation.turns().to_vec()
    }

    /// Probe for the accelerator and a compute device
    ///
    /// Never fails: every problem becomes `supported: false` with a reason.
    pub async fn check_compatibility(&self) -> CompatibilityReport {
        let info = match self.runtime.detect_accelerator().await {
            Ok(Some(info)) => info,
            Ok(None) => {
                return CompatibilityReport::unsupported("Acceleration API not available")
            }
            Err(e) => {
                return CompatibilityReport::unsupported(format!(
                    "Acceleration API probe failed: {e}"
                ))
            }
        };

        match self.runtime.request_device().await {
            Ok(true) => CompatibilityReport::supported(info),
            Ok(false) => CompatibilityReport::unsupported("No compatible compute device found"),
            Err(e) => CompatibilityReport::unsupported(format!("Device request failed: {e}")),
        }
    }

    /// Load the model and seed the conversation
    ///
    /// Returns true immediately if already initialized, and false without
    /// starting anything if a load is already running. Progress, readiness
    /// and failure are reported on `events`.
    pub async fn init(&self, options: InitOptions, events: mpsc::Sender<EngineEvent>) -> bool {
        {
            let mut state = self.state.lock();
            if state.initialized {
                return true;
            }
            if state.loading {
                tracing::debug!("Init requested while a load is running, ignoring");
                return false;
            }
            state.loading = true;
            state.progress = 0;
            state.status = EngineStatus::Checking;
        }

        let _ = events
            .send(EngineEvent::Progress(ProgressReport {
                percent: 0,
                text: "Checking compatibility".to_string(),
            }))
            .await;

        let report = self.check_compatibility().await;
        if !report.supported {
            tracing::warn!(reason = %report.reason, "Inference runtime not supported");
            {
                let mut state = self.state.lock();
                state.loading = false;
                state.status = EngineStatus::Unsupported;
            }
            let _ = events
                .send(EngineEvent::Unsupported {
                    reason: report.reason,
                })
                .await;
            return false;
        }

        tracing::info!(
            runtime = self.runtime.name(),
            accelerator = %report.reason,
            model = %options.model_id,
            "Loading model"
        );
        self.state.lock().status = EngineStatus::Loading;
        let _ = events.send(EngineEvent::Loading).await;

        let outcome = tokio::time::timeout(
            options.load_timeout,
            self.load_with_progress(&options.model_id, &events),
        )
        .await;

        let error = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some(format!(
                "model load timed out after {}s",
                options.load_timeout.as_secs()
            )),
        };

        if let Some(error) = error {
            tracing::error!(error = %error, "Model load failed");
            {
                let mut state = self.state.lock();
                state.loading = false;
                state.status = EngineStatus::Error;
            }
            let _ = events.send(EngineEvent::Failed { error }).await;
            return false;
        }

        {
            let mut state = self.state.lock();
            state.conversation = Conversation::new(options.system_prompt);
            state.model_id = options.model_id;
            state.temperature = options.temperature;
            state.initialized = true;
            state.loading = false;
            state.progress = 100;
            state.status = EngineStatus::Ready;
        }

        let _ = events
            .send(EngineEvent::Progress(ProgressReport {
                percent: 100,
                text: "AI Ready".to_string(),
            }))
            .await;
        let _ = events.send(EngineEvent::Ready).await;

        tracing::info!("Engine initialized");
        true
    }

    /// Drive `runtime.load`, forwarding its status lines as progress
    async fn load_with_progress(
        &self,
        model_id: &str,
        events: &mpsc::Sender<EngineEvent>,
    ) -> anyhow::Result<()> {
        let (progress_tx, mut progress_rx) = mpsc::channel::<String>(32);
        let mut load = std::pin::pin!(self.runtime.load(model_id, progress_tx));

        loop {
            tokio::select! {
                biased;
                Some(text) = progress_rx.recv() => self.report_progress(text, events).await,
                result = &mut load => {
                    while let Ok(text) = progress_rx.try_recv() {
                        self.report_progress(text, events).await;
                    }
                    return result;
                }
            }
        }
    }

    async fn report_progress(&self, text: String, events: &mpsc::Sender<EngineEvent>) {
        let percent = {
            let mut state = self.state.lock();
            state.progress = state.progress.max(parse_progress(&text));
            state.progress
        };
        tracing::trace!(percent, text = %text, "Load progress");
        let _ = events
            .send(EngineEvent::Progress(ProgressReport { percent, text }))
            .await;
    }

    /// Start streaming an answer to `message`
    ///
    /// The user turn is appended before the request goes out.
    pub async fn chat(&self, message: &str) -> Result<ChatStream, EngineError> {
        let (request, exchange) = {
            let mut state = self.state.lock();
            if !state.initialized {
                return Err(EngineError::NotInitialized);
            }
            let exchange = state
                .conversation
                .begin_exchange(message)
                .ok_or(EngineError::StreamBusy)?;
            let request = ChatRequest::new(
                state.model_id.clone(),
                state.conversation.turns().to_vec(),
            )
            .with_temperature(state.temperature);
            (request, exchange)
        };

        match self.runtime.stream_chat(&request).await {
            Ok(receiver) => Ok(ChatStream {
                receiver,
                state: Arc::clone(&self.state),
                exchange,
                response: String::new(),
                finished: false,
            }),
            Err(e) => {
                self.state.lock().conversation.cancel_exchange(exchange);
                Err(EngineError::Runtime(e.to_string()))
            }
        }
    }

    /// Stream an answer and collect it into one string
    pub async fn chat_complete(&self, message: &str) -> Result<String, EngineError> {
        let mut stream = self.chat(message).await?;
        let mut response = String::new();
        while let Some(chunk) = stream.next().await {
            response.push_str(&chunk?);
        }
        Ok(response)
    }

    /// Back to the seeded conversation; the model stays loaded
    pub fn reset(&self) {
        self.state.lock().conversation.reset();
        tracing::debug!("Conversation reset");
    }

    /// Release the model and forget everything
    ///
    /// Runtime errors are logged; local state is cleared regardless.
    pub async fn unload(&self) {
        if let Err(e) = self.runtime.unload().await {
            tracing::warn!(error = %e, "Runtime unload failed");
        }
        *self.state.lock() = EngineState::default();
    }
}

/// A streamed answer
///
/// Yields text chunks in emission order and ends after the runtime reports
/// completion. A failure yields one `Err` and then ends.
pub struct ChatStream {
    receiver: mpsc::Receiver<StreamingToken>,
    state: SharedState,
    exchange: Exchange,
    response: String,
    finished: bool,
}

impl ChatStream {
    /// Text received so far
    pub fn response(&self) -> &str {
        &self.response
    }

    fn finish(&mut self, completed: bool) {
        self.finished = true;
        let mut state = self.state.lock();
        if completed {
            let answer = std::mem::take(&mut self.response);
            if !state.conversation.commit_exchange(self.exchange, answer) {
                tracing::debug!("Conversation reset mid-stream, answer discarded");
            }
        } else {
            state.conversation.cancel_exchange(self.exchange);
        }
    }
}

impl Stream for ChatStream {
    type Item = Result<String, EngineError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        match this.receiver.poll_recv(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(StreamingToken::Token(chunk))) => {
                this.response.push_str(&chunk);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(StreamingToken::Complete)) => {
                this.finish(true);
                Poll::Ready(None)
            }
            Poll::Ready(Some(StreamingToken::Error(e))) => {
                this.finish(false);
                Poll::Ready(Some(Err(EngineError::Stream(e))))
            }
            Poll::Ready(None) => {
                this.finish(false);
                Poll::Ready(Some(Err(EngineError::Stream(
                    "runtime closed the stream early".to_string(),
                ))))
            }
        }
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        // Receiver drops with us, which stops generation
        if !self.finished {
            self.finish(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Runtime that replays scripted answers
    struct MockRuntime {
        accelerator: Option<String>,
        device: anyhow::Result<bool>,
        load_steps: Vec<String>,
        load_delay: Duration,
        load_error: Option<String>,
        unload_error: bool,
        replies: Mutex<VecDeque<Vec<StreamingToken>>>,
        loads: AtomicUsize,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl Default for MockRuntime {
        fn default() -> Self {
            Self {
                accelerator: Some("mock gpu".to_string()),
                device: Ok(true),
                load_steps: Vec::new(),
                load_delay: Duration::ZERO,
                load_error: None,
                unload_error: false,
                replies: Mutex::new(VecDeque::new()),
                loads: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl MockRuntime {
        fn with_reply(self, tokens: Vec<StreamingToken>) -> Self {
            self.replies.lock().push_back(tokens);
            self
        }
    }

    #[async_trait]
    impl InferenceRuntime for MockRuntime {
        fn name(&self) -> &str {
            "mock"
        }

        async fn detect_accelerator(&self) -> anyhow::Result<Option<String>> {
            Ok(self.accelerator.clone())
        }

        async fn request_device(&self) -> anyhow::Result<bool> {
            match &self.device {
                Ok(found) => Ok(*found),
                Err(e) => anyhow::bail!("{e}"),
            }
        }

        async fn load(&self, _model_id: &str, progress: mpsc::Sender<String>) -> anyhow::Result<()> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            for step in &self.load_steps {
                let _ = progress.send(step.clone()).await;
            }
            if !self.load_delay.is_zero() {
                tokio::time::sleep(self.load_delay).await;
            }
            match &self.load_error {
                Some(e) => anyhow::bail!("{e}"),
                None => Ok(()),
            }
        }

        async fn stream_chat(
            &self,
            request: &ChatRequest,
        ) -> anyhow::Result<mpsc::Receiver<StreamingToken>> {
            self.requests.lock().push(request.clone());
            let script = self.replies.lock().pop_front().unwrap_or_else(|| {
                vec![StreamingToken::Token("ok".into()), StreamingToken::Complete]
            });
            let (tx, rx) = mpsc::channel(script.len().max(1));
            for token in script {
                tx.try_send(token).unwrap();
            }
            Ok(rx)
        }

        async fn unload(&self) -> anyhow::Result<()> {
            if self.unload_error {
                anyhow::bail!("unload exploded");
            }
            Ok(())
        }
    }

    fn options() -> InitOptions {
        InitOptions::new("test-model", "You are a portfolio assistant")
    }

    async fn ready_adapter(runtime: MockRuntime) -> EngineAdapter<MockRuntime> {
        let adapter = EngineAdapter::new(runtime);
        let (tx, _rx) = mpsc::channel(64);
        assert!(adapter.init(options(), tx).await);
        adapter
    }

    fn drain(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn percents(events: &[EngineEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                EngineEvent::Progress(p) => Some(p.percent),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_progress_numbers() {
        assert_eq!(parse_progress("Loading model... 45%"), 45);
        assert_eq!(parse_progress("Fetching param cache[3/10]: 12.7 %"), 12);
        assert_eq!(parse_progress("done 100%"), 99);
        assert_eq!(parse_progress("v1.2.3% odd"), 2);
        assert_eq!(parse_progress("first 5% then 80%"), 5);
    }

    #[test]
    fn test_parse_progress_keywords() {
        assert_eq!(parse_progress("Fetching model: pulling manifest"), 10);
        assert_eq!(parse_progress("Loading model into memory"), 30);
        assert_eq!(parse_progress("Compiling shaders"), 60);
        assert_eq!(parse_progress("Initializing chat session"), 80);
        assert_eq!(parse_progress("something else"), 0);
        assert_eq!(parse_progress("5.% not a number"), 0);
    }

    #[tokio::test]
    async fn test_init_seeds_system_turn() {
        let adapter = ready_adapter(MockRuntime::default()).await;

        assert_eq!(adapter.status(), EngineStatus::Ready);
        assert_eq!(adapter.progress(), 100);
        let history = adapter.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::System);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let adapter = ready_adapter(MockRuntime::default()).await;
        let (tx, mut rx) = mpsc::channel(8);

        assert!(adapter.init(options(), tx).await);
        assert_eq!(adapter.runtime().loads.load(Ordering::SeqCst), 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_init_loads_once() {
        let adapter = EngineAdapter::new(MockRuntime {
            load_delay: Duration::from_millis(50),
            ..MockRuntime::default()
        });
        let (tx, _rx) = mpsc::channel(64);

        let (first, second) = tokio::join!(
            adapter.init(options(), tx.clone()),
            adapter.init(options(), tx.clone())
        );

        assert!(first);
        assert!(!second);
        assert_eq!(adapter.runtime().loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let adapter = EngineAdapter::new(MockRuntime {
            load_steps: vec![
                "Fetching model... 40%".into(),
                "Loading model into memory".into(),
                "Fetching model... 70%".into(),
            ],
            ..MockRuntime::default()
        });
        let (tx, mut rx) = mpsc::channel(64);

        assert!(adapter.init(options(), tx).await);
        let events = drain(&mut rx);

        assert_eq!(percents(&events), vec![0, 40, 40, 70, 100]);
        assert_eq!(events.last(), Some(&EngineEvent::Ready));
    }

    #[tokio::test]
    async fn test_unsupported_without_accelerator() {
        let adapter = EngineAdapter::new(MockRuntime {
            accelerator: None,
            ..MockRuntime::default()
        });
        let (tx, mut rx) = mpsc::channel(64);

        assert!(!adapter.init(options(), tx).await);
        assert_eq!(adapter.status(), EngineStatus::Unsupported);
        assert!(!adapter.is_loading());
        assert_eq!(adapter.runtime().loads.load(Ordering::SeqCst), 0);
        assert!(matches!(
            drain(&mut rx).last(),
            Some(EngineEvent::Unsupported { .. })
        ));
    }

    #[tokio::test]
    async fn test_device_request_error_is_unsupported() {
        let adapter = EngineAdapter::new(MockRuntime {
            device: Err(anyhow::anyhow!("adapter lost")),
            ..MockRuntime::default()
        });

        let report = adapter.check_compatibility().await;
        assert!(!report.supported);
        assert!(report.reason.contains("adapter lost"));
    }

    #[tokio::test]
    async fn test_load_failure_is_error() {
        let adapter = EngineAdapter::new(MockRuntime {
            load_error: Some("disk full".into()),
            ..MockRuntime::default()
        });
        let (tx, mut rx) = mpsc::channel(64);

        assert!(!adapter.init(options(), tx).await);
        assert_eq!(adapter.status(), EngineStatus::Error);
        assert_eq!(
            drain(&mut rx).last(),
            Some(&EngineEvent::Failed {
                error: "disk full".into()
            })
        );
    }

    #[tokio::test]
    async fn test_load_timeout_is_error() {
        let adapter = EngineAdapter::new(MockRuntime {
            load_delay: Duration::from_secs(30),
            ..MockRuntime::default()
        });
        let (tx, mut rx) = mpsc::channel(64);

        let opts = options().with_load_timeout(Duration::from_millis(20));
        assert!(!adapter.init(opts, tx).await);
        assert_eq!(adapter.status(), EngineStatus::Error);
        match drain(&mut rx).last() {
            Some(EngineEvent::Failed { error }) => assert!(error.contains("timed out")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_new_cycle_restarts_progress() {
        let adapter = EngineAdapter::new(MockRuntime {
            load_steps: vec!["Fetching model... 60%".into()],
            load_error: Some("boom".into()),
            ..MockRuntime::default()
        });
        let (tx, mut rx) = mpsc::channel(64);

        assert!(!adapter.init(options(), tx.clone()).await);
        assert_eq!(percents(&drain(&mut rx)), vec![0, 60]);

        assert!(!adapter.init(options(), tx).await);
        assert_eq!(percents(&drain(&mut rx)), vec![0, 60]);
        assert_eq!(adapter.runtime().loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_chat_before_init() {
        let adapter = EngineAdapter::new(MockRuntime::default());
        assert_eq!(
            adapter.chat("hello").await.err(),
            Some(EngineError::NotInitialized)
        );
    }

    #[tokio::test]
    async fn test_chat_commits_concatenated_answer() {
        let runtime = MockRuntime::default().with_reply(vec![
            StreamingToken::Token("I built ".into()),
            StreamingToken::Token("a compiler.".into()),
            StreamingToken::Complete,
        ]);
        let adapter = ready_adapter(runtime).await;

        let mut stream = adapter.chat("What projects have you built?").await.unwrap();
        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk.unwrap());
        }

        assert_eq!(chunks, vec!["I built ", "a compiler."]);
        let history = adapter.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].content, "What projects have you built?");
        assert_eq!(history[2].role, Role::Assistant);
        assert_eq!(history[2].content, "I built a compiler.");

        // The request carried the system and user turns
        let requests = adapter.runtime().requests.lock();
        assert_eq!(requests[0].messages.len(), 2);
        assert_eq!(requests[0].model, "test-model");
    }

    #[tokio::test]
    async fn test_stream_error_rolls_back() {
        let runtime = MockRuntime::default().with_reply(vec![
            StreamingToken::Token("partial".into()),
            StreamingToken::Error("gpu hang".into()),
        ]);
        let adapter = ready_adapter(runtime).await;

        let mut stream = adapter.chat("hi").await.unwrap();
        assert_eq!(stream.next().await, Some(Ok("partial".to_string())));
        assert_eq!(
            stream.next().await,
            Some(Err(EngineError::Stream("gpu hang".into())))
        );
        assert_eq!(stream.next().await, None);

        assert_eq!(adapter.history().len(), 1);
        // Session remains usable
        assert_eq!(adapter.chat_complete("again").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_drop_mid_stream_rolls_back() {
        let runtime = MockRuntime::default().with_reply(vec![
            StreamingToken::Token("a".into()),
            StreamingToken::Token("b".into()),
            StreamingToken::Complete,
        ]);
        let adapter = ready_adapter(runtime).await;

        let mut stream = adapter.chat("hi").await.unwrap();
        let _ = stream.next().await;
        drop(stream);

        assert_eq!(adapter.history().len(), 1);
    }

    #[tokio::test]
    async fn test_second_stream_is_busy() {
        let adapter = ready_adapter(MockRuntime::default()).await;

        let _first = adapter.chat("one").await.unwrap();
        assert_eq!(
            adapter.chat("two").await.err(),
            Some(EngineError::StreamBusy)
        );
    }

    #[tokio::test]
    async fn test_reset_mid_stream_discards_answer() {
        let adapter = ready_adapter(MockRuntime::default()).await;

        let mut stream = adapter.chat("one").await.unwrap();
        adapter.reset();
        while stream.next().await.is_some() {}

        assert_eq!(adapter.history().len(), 1);
    }

    #[tokio::test]
    async fn test_history_alternates() {
        let adapter = ready_adapter(MockRuntime::default()).await;
        for question in ["a", "b", "c"] {
            adapter.chat_complete(question).await.unwrap();
        }

        let roles: Vec<Role> = adapter.history().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );

        adapter.reset();
        assert_eq!(adapter.history().len(), 1);
    }

    #[tokio::test]
    async fn test_unload_clears_even_on_error() {
        let adapter = ready_adapter(MockRuntime {
            unload_error: true,
            ..MockRuntime::default()
        })
        .await;

        adapter.unload().await;

        assert!(!adapter.is_initialized());
        assert!(adapter.history().is_empty());
        assert_eq!(
            adapter.chat("x").await.err(),
            Some(EngineError::NotInitialized)
        );
    }
}
