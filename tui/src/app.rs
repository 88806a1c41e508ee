//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - WidgetClient for the embedded widget controller
//! - Transcript for rendering
//!
//! The App holds no chat behavior of its own. It:
//! 1. Converts terminal events to WidgetEvents
//! 2. Sends them to the embedded controller via WidgetClient
//! 3. Folds WidgetMessages into a Transcript
//! 4. Renders from the Transcript

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Position, Rect};
use ratatui::Terminal;

use widget_core::{Transcript, UiState, WidgetEvent, WidgetSettings};

use crate::ui;
use crate::widget_client::WidgetClient;

/// Lines moved per mouse wheel step
const WHEEL_LINES: usize = 3;

/// Translate a key press into widget events, editing the input in place
pub fn events_for_key(key: KeyEvent, transcript: &mut Transcript) -> Vec<WidgetEvent> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            vec![WidgetEvent::Quit]
        }
        KeyCode::Tab if transcript.ui_state == UiState::Collapsed => vec![WidgetEvent::Focus],
        KeyCode::Esc => match transcript.ui_state {
            UiState::ChatOpen => vec![WidgetEvent::Close],
            UiState::Focused => vec![WidgetEvent::Blur],
            _ => Vec::new(),
        },
        KeyCode::Enter => vec![WidgetEvent::Submit],
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            transcript.input.push(c);
            let mut events = Vec::with_capacity(2);
            // Typing into the collapsed box focuses it
            if transcript.ui_state == UiState::Collapsed {
                events.push(WidgetEvent::Focus);
            }
            events.push(WidgetEvent::InputChanged {
                text: transcript.input.clone(),
            });
            events
        }
        KeyCode::Backspace => {
            if transcript.input.pop().is_none() {
                return Vec::new();
            }
            vec![WidgetEvent::InputChanged {
                text: transcript.input.clone(),
            }]
        }
        _ => Vec::new(),
    }
}

/// A left click inside the widget focuses it; anywhere else is an outside click
pub fn event_for_click(column: u16, row: u16, widget_area: Rect) -> WidgetEvent {
    if widget_area.contains(Position::new(column, row)) {
        WidgetEvent::Focus
    } else {
        WidgetEvent::OutsideClick
    }
}

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,
    /// Client for the embedded widget controller
    client: WidgetClient,
    /// Display state folded from WidgetMessages
    transcript: Transcript,
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Total rendered lines (for scroll bounds)
    total_lines: usize,
    /// Widget container from the last frame
    widget_area: Rect,
    /// Terminal size
    size: (u16, u16),
}

impl App {
    /// Create a new App instance
    pub fn new(settings: &WidgetSettings) -> anyhow::Result<Self> {
        let size = crossterm::terminal::size()?;

        Ok(Self {
            running: true,
            client: WidgetClient::new(settings),
            transcript: Transcript::new(),
            scroll_offset: 0,
            total_lines: 0,
            widget_area: Rect::default(),
            size,
        })
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // ~30 FPS keeps streamed text and the typewriter smooth
        let frame_duration = Duration::from_millis(33);
        let mut event_stream = EventStream::new();

        self.client.start().await;
        self.process_messages();
        self.render(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => match event {
                            // Only handle Press events (not Release or Repeat)
                            Event::Key(key) if key.kind == KeyEventKind::Press => {
                                self.handle_key(key).await;
                            }
                            Event::Mouse(mouse) => self.handle_mouse(mouse).await,
                            Event::Resize(w, h) => self.size = (w, h),
                            _ => {}
                        },
                        Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                        None => self.client.send(WidgetEvent::Quit).await,
                    }
                }

                // Frame tick
                _ = tokio::time::sleep(Duration::from_millis(16)) => {}
            }

            self.client.poll().await;
            self.process_messages();
            self.render(terminal)?;

            if self.transcript.quit {
                self.running = false;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                tokio::time::sleep(frame_duration - elapsed).await;
            }
        }

        Ok(())
    }

    /// Fold all pending controller messages into the transcript
    fn process_messages(&mut self) {
        for msg in self.client.recv_all() {
            self.transcript.apply(msg);
        }
        if self.transcript.take_scroll() {
            self.scroll_offset = 0;
        }
    }

    /// Handle keyboard input
    async fn handle_key(&mut self, key: KeyEvent) {
        let page = usize::from(self.size.1.saturating_sub(ui::INPUT_HEIGHT + 1) / 2);
        match key.code {
            KeyCode::PageUp => {
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + page).min(max_scroll);
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(page);
            }
            _ => {
                for event in events_for_key(key, &mut self.transcript) {
                    self.client.send(event).await;
                }
            }
        }
    }

    /// Handle mouse input
    async fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let event = event_for_click(mouse.column, mouse.row, self.widget_area);
                self.client.send(event).await;
            }
            MouseEventKind::ScrollUp => {
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + WHEEL_LINES).min(max_scroll);
            }
            MouseEventKind::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(WHEEL_LINES);
            }
            _ => {}
        }
    }

    /// Render the current transcript
    fn render(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
        let mut result = ui::DrawResult::default();
        terminal.draw(|frame| {
            result = ui::draw(frame, &self.transcript, self.scroll_offset);
        })?;
        self.widget_area = result.widget_area;
        self.total_lines = result.total_lines;
        Ok(())
    }
}
