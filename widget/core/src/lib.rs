//! Widget Core - Headless Portfolio Chat Widget
//!
//! This crate holds all of the chat widget's behavior, independent of any UI
//! framework. A terminal surface, a web view or a test harness drives it the
//! same way: send [`WidgetEvent`]s up, render [`WidgetMessage`]s coming down.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        UI Surfaces                            │
//! │        ┌─────────┐   ┌───────────┐   ┌──────────────┐         │
//! │        │   TUI   │   │  Web view │   │ Test harness │         │
//! │        └────┬────┘   └─────┬─────┘   └──────┬───────┘         │
//! │             └──────────────┼────────────────┘                 │
//! │                 WidgetEvent (up) / WidgetMessage (down)       │
//! └────────────────────────────┼──────────────────────────────────┘
//!                              │
//! ┌────────────────────────────┼──────────────────────────────────┐
//! │                       WIDGET CORE                             │
//! │  ┌─────────────────────────┴───────────────────────────────┐  │
//! │  │                  WidgetController                       │  │
//! │  │  ┌──────────┐  ┌───────────────┐  ┌──────────────────┐  │  │
//! │  │  │ UiState  │  │  Placeholder  │  │    Analytics     │  │  │
//! │  │  │ machine  │  │    Rotator    │  │      Sink        │  │  │
//! │  │  └──────────┘  └───────────────┘  └──────────────────┘  │  │
//! │  └─────────────────────────┬───────────────────────────────┘  │
//! │                 EngineAdapter (status, history)               │
//! │                            │                                  │
//! │                 InferenceRuntime (Ollama, mocks)              │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`WidgetController`]: owns the UI state machine and the queued message
//! - [`EngineAdapter`]: owns engine status, load progress and history
//! - [`InferenceRuntime`]: the seam to whatever runs the model
//! - [`PlaceholderRotator`]: cycles suggestions through the empty input
//! - [`Transcript`]: surface-side fold of every [`WidgetMessage`]
//!
//! # Quick Start
//!
//! ```ignore
//! use widget_core::{
//!     ContentStore, ControllerConfig, NoopAnalytics, OllamaRuntime, WidgetController,
//!     WidgetEvent, WidgetSettings,
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = WidgetSettings::from_env();
//!     let content = ContentStore::load(&settings.data_dir);
//!     let config = ControllerConfig::from_content(&content, &settings);
//!
//!     let (msg_tx, mut msg_rx) = mpsc::channel(256);
//!     let (event_tx, event_rx) = mpsc::channel(64);
//!     let mut controller =
//!         WidgetController::new(OllamaRuntime::from_env(), NoopAnalytics, config, msg_tx);
//!
//!     event_tx.send(WidgetEvent::InputChanged { text: "Hi".into() }).await.unwrap();
//!     event_tx.send(WidgetEvent::Submit).await.unwrap();
//!     controller.run(event_rx).await;
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod content;
pub mod controller;
pub mod display;
pub mod engine;
pub mod events;
pub mod messages;
pub mod rotator;
pub mod runtime;
pub mod session;
pub mod state;

pub use analytics::{AnalyticsSink, ChatLogRecord, ChatOutcome, HttpAnalytics, NoopAnalytics};
pub use config::{load_settings, ConfigError, WidgetSettings};
pub use content::{build_system_prompt, AiConfig, AiContext, ContentStore};
pub use controller::{ControllerConfig, WidgetController};
pub use display::{Bubble, Transcript};
pub use engine::{
    parse_progress, ChatStream, CompatibilityReport, EngineAdapter, EngineError, InitOptions,
};
pub use events::{EngineEvent, ProgressReport, WidgetEvent};
pub use messages::{DisplayId, DisplayRole, EngineStatus, WidgetMessage};
pub use rotator::{PlaceholderFrame, PlaceholderRotator, RotationState, RotatorStyle};
pub use runtime::{ChatRequest, InferenceRuntime, OllamaRuntime, StreamingToken};
pub use session::{Conversation, ConversationTurn, Role};
pub use state::{transition, UiState, UiTrigger, VisualFlags};
