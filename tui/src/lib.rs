//! Widget TUI - Terminal surface for the portfolio chat widget
//!
//! Renders the headless widget from `widget-core` in a terminal: a compact
//! input box with rotating suggestions that widens on focus and opens into
//! a chat panel once a question is sent.
//!
//! # Architecture
//!
//! - **WidgetClient**: embeds and polls the widget controller
//! - **App**: terminal event loop, input editing, hit testing
//! - **UI**: pure rendering from a `Transcript`
//! - **Theme**: colors and styles

pub mod app;
pub mod theme;
pub mod ui;
pub mod widget_client;

pub use app::App;
