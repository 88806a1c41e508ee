//! Display Transcript
//!
//! Surface-side model of the widget: everything the controller has told a
//! surface, folded into plain data. A surface applies each
//! [`WidgetMessage`] here and renders from the result.

use crate::messages::{DisplayId, DisplayRole, EngineStatus, WidgetMessage};
use crate::state::UiState;

/// One message bubble
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bubble {
    /// Handle the controller addresses it by
    pub id: DisplayId,
    /// Who it belongs to
    pub role: DisplayRole,
    /// Current text
    pub text: String,
}

/// Folded widget display state
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    /// Interactive phase
    pub ui_state: UiState,
    /// Engine lifecycle
    pub engine_status: EngineStatus,
    /// Status line text
    pub status_text: String,
    /// Load progress percent
    pub progress: u8,
    /// Text in the input field (edited by the surface)
    pub input: String,
    /// Placeholder shown while the input is empty
    pub placeholder: String,
    /// Placeholder mid fade-out
    pub placeholder_fading: bool,
    /// Send control enabled
    pub send_enabled: bool,
    /// "Learn more" link target
    pub learn_more: Option<String>,
    /// A scroll to the newest bubble is pending
    pub scroll_to_bottom: bool,
    /// The controller asked the surface to quit
    pub quit: bool,
    bubbles: Vec<Bubble>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one message in
    pub fn apply(&mut self, message: WidgetMessage) {
        match message {
            WidgetMessage::UiState { state } => self.ui_state = state,
            WidgetMessage::EngineStatus { status, text } => {
                self.engine_status = status;
                self.status_text = text;
            }
            WidgetMessage::Progress { percent } => self.progress = percent,
            WidgetMessage::AppendMessage { id, role, content } => self.bubbles.push(Bubble {
                id,
                role,
                text: content,
            }),
            WidgetMessage::SetText { id, text } => {
                if let Some(bubble) = self.bubble_mut(&id) {
                    bubble.text = text;
                }
            }
            WidgetMessage::AppendText { id, chunk } => {
                if let Some(bubble) = self.bubble_mut(&id) {
                    bubble.text.push_str(&chunk);
                }
            }
            WidgetMessage::ScrollToBottom => self.scroll_to_bottom = true,
            WidgetMessage::ClearMessages => self.bubbles.clear(),
            WidgetMessage::ClearInput => self.input.clear(),
            WidgetMessage::Placeholder { text, fading } => {
                self.placeholder = text;
                self.placeholder_fading = fading;
            }
            WidgetMessage::SendEnabled { enabled } => self.send_enabled = enabled,
            WidgetMessage::LearnMoreLink { url } => self.learn_more = Some(url),
            WidgetMessage::Quit => self.quit = true,
        }
    }

    /// Bubbles in display order
    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    /// Look a bubble up by handle
    pub fn bubble(&self, id: &DisplayId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| &b.id == id)
    }

    fn bubble_mut(&mut self, id: &DisplayId) -> Option<&mut Bubble> {
        // Updates almost always target the newest bubble
        self.bubbles.iter_mut().rev().find(|b| &b.id == id)
    }

    /// Take the pending scroll request
    pub fn take_scroll(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_bottom)
    }
}
