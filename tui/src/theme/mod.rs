//! Theme and Colors
//!
//! Palette for the chat widget. Accent colors follow the site: magenta for
//! the assistant, green for the visitor, gray for anything secondary.

use ratatui::style::{Color, Modifier, Style};

use widget_core::EngineStatus;

// ============================================================================
// UI Colors
// ============================================================================

/// Widget accent (borders while focused, titles)
pub const ACCENT: Color = Color::Magenta;

/// Assistant text
pub const AI_MAGENTA: Color = Color::Rgb(230, 140, 230);

/// Visitor text
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// Placeholder, hints and idle borders
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Failure states
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Ready indicator
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Loading indicator and gauge
pub const LOADING_AMBER: Color = Color::Rgb(255, 200, 90);

/// Link text
pub const LINK_BLUE: Color = Color::Rgb(100, 180, 255);

// ============================================================================
// Styles
// ============================================================================

/// Color of the engine status dot
pub fn status_color(status: EngineStatus) -> Color {
    match status {
        EngineStatus::Checking | EngineStatus::Loading => LOADING_AMBER,
        EngineStatus::Ready => SUCCESS_GREEN,
        EngineStatus::Error | EngineStatus::Unsupported => ERROR_RED,
    }
}

/// Placeholder text, dimmed further mid fade-out
pub fn placeholder_style(fading: bool) -> Style {
    let style = Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC);
    if fading {
        style.add_modifier(Modifier::DIM)
    } else {
        style
    }
}

/// Input border, highlighted while the widget has focus
pub fn border_style(active: bool) -> Style {
    Style::default().fg(if active { ACCENT } else { DIM_GRAY })
}
