//! Widget Rendering
//!
//! Pure drawing from a [`Transcript`]. Layout follows the widget's visual
//! flags:
//!
//! ```text
//!   Collapsed            Focused               ChatOpen / Closing
//!                                              ┌ Chat ─────────────────┐
//!                                              │ You: question          │
//!                                              │ AI:  streamed answer   │
//!      ┌──────────┐    ┌──────────────────┐    ├────────────────────────┤
//!      │ Ask ...  │    │ Ask ...          │    │ Type a message...      │
//!      └──────────┘    └──────────────────┘    └────────────────────────┘
//!   ● status line                               ● status line
//! ```

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use widget_core::{DisplayRole, Transcript};

use crate::theme;

/// Input box height including borders
pub const INPUT_HEIGHT: u16 = 3;

/// Narrowest collapsed input
const MIN_COLLAPSED_WIDTH: u16 = 30;

const USER_PREFIX: &str = "You: ";
const AI_PREFIX: &str = "AI:  ";

/// Where things landed in the last frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawResult {
    /// The widget container (clicks outside it are outside clicks)
    pub widget_area: Rect,
    /// Rendered message lines, for scroll bounds
    pub total_lines: usize,
}

/// Split the screen into widget container and status line
pub fn widget_area(area: Rect, transcript: &Transcript) -> (Rect, Rect) {
    let [body, status] = Layout::vertical([Constraint::Min(INPUT_HEIGHT), Constraint::Length(1)])
        .areas(area);
    let flags = transcript.ui_state.flags();

    if flags.expanded {
        return (body, status);
    }

    let width = if flags.width_expanded {
        body.width
    } else {
        (body.width * 2 / 5).max(MIN_COLLAPSED_WIDTH).min(body.width)
    };
    let height = INPUT_HEIGHT.min(body.height);
    let x = body.x + (body.width - width) / 2;
    let y = body.y + body.height - height;
    (Rect::new(x, y, width, height), status)
}

/// Draw one frame
pub fn draw(frame: &mut Frame, transcript: &Transcript, scroll_offset: usize) -> DrawResult {
    let (widget, status) = widget_area(frame.area(), transcript);
    let flags = transcript.ui_state.flags();

    let mut total_lines = 0;
    let input_area = if flags.expanded {
        let [panel, input] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(INPUT_HEIGHT)]).areas(widget);
        total_lines = draw_panel(frame, panel, transcript, scroll_offset);
        input
    } else {
        widget
    };

    draw_input(frame, input_area, transcript, flags.width_expanded);
    draw_status(frame, status, transcript);

    DrawResult {
        widget_area: widget,
        total_lines,
    }
}

fn draw_panel(frame: &mut Frame, area: Rect, transcript: &Transcript, scroll_offset: usize) -> usize {
    let mut block = Block::default()
        .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
        .border_style(theme::border_style(true))
        .title(Span::styled(
            " Chat ",
            Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD),
        ));
    if let Some(url) = &transcript.learn_more {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" Learn more: {url} "),
                Style::default().fg(theme::LINK_BLUE),
            ))
            .right_aligned(),
        );
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut messages_area = inner;
    if transcript.engine_status.is_pending() && inner.height > 1 {
        let [gauge_area, rest] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme::LOADING_AMBER))
            .percent(u16::from(transcript.progress.min(100)))
            .label(format!("{} {}%", transcript.status_text, transcript.progress));
        frame.render_widget(gauge, gauge_area);
        messages_area = rest;
    }

    let lines = message_lines(transcript, messages_area.width);
    let total = lines.len();
    let visible = usize::from(messages_area.height);
    let start = total.saturating_sub(visible + scroll_offset);
    let shown: Vec<Line> = lines.into_iter().skip(start).take(visible).collect();
    frame.render_widget(Paragraph::new(shown), messages_area);

    total
}

/// Wrap every bubble to `width` columns, prefix first lines with the speaker
pub fn message_lines(transcript: &Transcript, width: u16) -> Vec<Line<'static>> {
    let prefix_width = USER_PREFIX.width();
    let text_width = usize::from(width).saturating_sub(prefix_width).max(1);
    let mut lines = Vec::new();

    for bubble in transcript.bubbles() {
        let (prefix, color) = match bubble.role {
            DisplayRole::User => (USER_PREFIX, theme::USER_GREEN),
            DisplayRole::Ai => (AI_PREFIX, theme::AI_MAGENTA),
        };
        let label = Style::default().fg(color).add_modifier(Modifier::BOLD);
        let body = Style::default().fg(color);

        // An empty AI bubble is a placeholder waiting for its first chunk
        let text = if bubble.text.is_empty() { "..." } else { bubble.text.as_str() };
        for (i, wrapped) in textwrap::wrap(text, text_width).into_iter().enumerate() {
            let lead = if i == 0 {
                Span::styled(prefix, label)
            } else {
                Span::raw(" ".repeat(prefix_width))
            };
            lines.push(Line::from(vec![lead, Span::styled(wrapped.into_owned(), body)]));
        }
        lines.push(Line::default());
    }
    lines
}

fn draw_input(frame: &mut Frame, area: Rect, transcript: &Transcript, active: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style(active));

    let line = if transcript.input.is_empty() {
        Line::from(Span::styled(
            transcript.placeholder.clone(),
            theme::placeholder_style(transcript.placeholder_fading),
        ))
    } else {
        let send = if transcript.send_enabled { " ⏎" } else { "" };
        Line::from(vec![
            Span::raw(transcript.input.clone()),
            Span::styled(send, Style::default().fg(theme::ACCENT)),
        ])
    };
    frame.render_widget(Paragraph::new(line).block(block), area);

    if active {
        let inner = area.inner(ratatui::layout::Margin::new(1, 1));
        let cursor = u16::try_from(transcript.input.width()).unwrap_or(u16::MAX);
        let x = inner
            .x
            .saturating_add(cursor)
            .min(inner.right().saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }
}

fn draw_status(frame: &mut Frame, area: Rect, transcript: &Transcript) {
    let color = theme::status_color(transcript.engine_status);
    let mut spans = vec![
        Span::styled("● ", Style::default().fg(color)),
        Span::styled(transcript.status_text.clone(), Style::default().fg(color)),
    ];
    if transcript.engine_status.is_pending() {
        spans.push(Span::styled(
            format!(" {}%", transcript.progress),
            Style::default().fg(theme::DIM_GRAY),
        ));
    }
    spans.push(Span::styled(
        "   Tab focus · Enter send · Esc close · Ctrl-C quit",
        Style::default().fg(theme::DIM_GRAY),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
