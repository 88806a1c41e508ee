//! Widget Messages
//!
//! Messages sent from the widget controller to a rendering surface. The
//! controller owns every piece of widget logic; a surface (terminal, web view,
//! test harness) applies these messages and nothing else.
//!
//! Display elements are addressed by [`DisplayId`]. The id is the opaque
//! handle a queued question keeps so its answer lands in the bubble that was
//! created when the question was submitted.

use serde::{Deserialize, Serialize};

use crate::state::UiState;

/// Messages from the controller to a surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WidgetMessage {
    // ============================================
    // Layout
    // ============================================
    /// The interactive phase changed
    UiState {
        /// The new state
        state: UiState,
    },

    /// Engine lifecycle changed (drives the status indicator)
    EngineStatus {
        /// The new status
        status: EngineStatus,
        /// Short text for the status line
        text: String,
    },

    /// Model load progress (0-100)
    Progress {
        /// Percent complete
        percent: u8,
    },

    // ============================================
    // Conversation display
    // ============================================
    /// Append a new message bubble
    AppendMessage {
        /// Handle for later updates
        id: DisplayId,
        /// Who the bubble belongs to
        role: DisplayRole,
        /// Initial text
        content: String,
    },

    /// Replace the text of an existing bubble
    SetText {
        /// Target bubble
        id: DisplayId,
        /// New text
        text: String,
    },

    /// Append a streamed chunk to an existing bubble
    AppendText {
        /// Target bubble
        id: DisplayId,
        /// Chunk text
        chunk: String,
    },

    /// Scroll the message view to the newest bubble
    ScrollToBottom,

    /// Remove every bubble
    ClearMessages,

    // ============================================
    // Input
    // ============================================
    /// Empty the input field
    ClearInput,

    /// Placeholder text shown in the empty input
    Placeholder {
        /// The placeholder text
        text: String,
        /// Mid fade-out (render dimmed)
        fading: bool,
    },

    /// Enable or disable the send control
    SendEnabled {
        /// Whether sending is possible
        enabled: bool,
    },

    /// Link target for the "learn more" affordance
    LearnMoreLink {
        /// Target URL
        url: String,
    },

    /// Request the surface to quit
    Quit,
}

/// Handle for a displayed message bubble
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayId(pub String);

impl DisplayId {
    /// Generate a new unique display ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("bubble_{id}"))
    }
}

impl Default for DisplayId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who a displayed bubble belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayRole {
    /// The visitor's question
    User,
    /// The assistant's answer (or a fixed notice in its place)
    Ai,
}

/// Lifecycle phase of the on-device language model runtime
///
/// Exactly one value at a time. Once `Ready` it only changes on an explicit
/// unload; `Error` and `Unsupported` are terminal for the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    /// Probing for an accelerator
    #[default]
    Checking,
    /// Fetching and preparing the model
    Loading,
    /// Ready for chat
    Ready,
    /// Model failed to load
    Error,
    /// No usable accelerator
    Unsupported,
}

impl EngineStatus {
    /// Whether no further progress is possible this session
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Error | Self::Unsupported)
    }

    /// Whether a submitted question must wait for readiness
    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Checking | Self::Loading)
    }

    /// Stable lowercase name (used in analytics records)
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
            Self::Unsupported => "unsupported",
        }
    }
}
