//! Widget Events
//!
//! Events flowing *into* the controller: what the surface observed the
//! visitor doing ([`WidgetEvent`]) and what the engine adapter reported while
//! loading ([`EngineEvent`]).
//!
//! Surfaces report, they don't interpret. A click is an `OutsideClick` whether
//! it should close the panel or merely shrink the input; the controller
//! decides.

use serde::{Deserialize, Serialize};

/// Events from a surface to the controller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetEvent {
    /// The input gained focus
    Focus,
    /// The input lost focus
    Blur,
    /// The input text changed
    InputChanged {
        /// Full current text
        text: String,
    },
    /// The send control was used (Enter or click)
    Submit,
    /// A click landed outside the widget container
    OutsideClick,
    /// The explicit close control was used
    Close,
    /// The surface is shutting down
    Quit,
}

/// One progress report during a model load
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Coarse percent (0-100), non-decreasing within one load
    pub percent: u8,
    /// Raw status text from the runtime
    pub text: String,
}

/// Events from the engine adapter during initialization
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Compatibility passed; the model load has begun
    Loading,
    /// Load progressed
    Progress(ProgressReport),
    /// Model loaded and conversation seeded
    Ready,
    /// No usable accelerator; terminal
    Unsupported {
        /// Human-readable reason
        reason: String,
    },
    /// Load failed; terminal
    Failed {
        /// Error description (logged, never shown)
        error: String,
    },
}
