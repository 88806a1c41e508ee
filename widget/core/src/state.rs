//! Widget UI State
//!
//! The interactive phase of the widget as an explicit enum with a pure
//! transition function. Surfaces derive their visual flags (width expanded,
//! message panel open, loading bar) from the state instead of storing them.

use serde::{Deserialize, Serialize};

/// Visual/interactive phase of the widget
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiState {
    /// Narrow input with a rotating placeholder
    #[default]
    Collapsed,
    /// Input focused, width expanded
    Focused,
    /// Message panel open
    ChatOpen,
    /// Message panel animating shut
    Closing,
}

/// Things that can move the widget between states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiTrigger {
    /// The input gained focus
    Focus,
    /// The blur debounce window passed with an empty input
    BlurSettled,
    /// A non-empty question was submitted
    Submit,
    /// A click landed outside the widget container
    OutsideClick,
    /// The explicit close control was used
    Close,
    /// The closing animation window elapsed
    ClosingElapsed,
}

/// Next state for `trigger`, or `None` when the trigger does nothing here
#[must_use]
pub fn transition(state: UiState, trigger: UiTrigger) -> Option<UiState> {
    use UiState as S;
    use UiTrigger as T;

    match (state, trigger) {
        (S::Collapsed, T::Focus) => Some(S::Focused),
        (S::Focused, T::BlurSettled | T::OutsideClick) => Some(S::Collapsed),
        (S::Collapsed | S::Focused | S::ChatOpen, T::Submit) => Some(S::ChatOpen),
        (S::ChatOpen, T::OutsideClick | T::Close) => Some(S::Closing),
        (S::Closing, T::ClosingElapsed) => Some(S::Collapsed),
        _ => None,
    }
}

/// Presentation flags derived from a state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisualFlags {
    /// Input spans the full width
    pub width_expanded: bool,
    /// Message panel visible
    pub expanded: bool,
    /// Placeholder rotation allowed
    pub rotating_placeholder: bool,
}

impl UiState {
    /// Derive presentation flags
    #[must_use]
    pub fn flags(self) -> VisualFlags {
        match self {
            Self::Collapsed => VisualFlags {
                width_expanded: false,
                expanded: false,
                rotating_placeholder: true,
            },
            Self::Focused => VisualFlags {
                width_expanded: true,
                expanded: false,
                rotating_placeholder: true,
            },
            Self::ChatOpen => VisualFlags {
                width_expanded: true,
                expanded: true,
                rotating_placeholder: false,
            },
            // Still drawn open while the panel animates shut
            Self::Closing => VisualFlags {
                width_expanded: true,
                expanded: true,
                rotating_placeholder: false,
            },
        }
    }

    /// Whether the message panel is showing
    #[must_use]
    pub fn is_chat_open(self) -> bool {
        self == Self::ChatOpen
    }
}
