use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::message::{Message, TranscriptRole};
use crate::ui::view::ChatView;

const USER_LABEL: &str = "You";
const ASSISTANT_LABEL: &str = "Omnichat";

/// Transcript lines: a meta line with sender and time, the content, then a
/// spacer. User messages sit on the right, assistant messages on the left.
pub fn build_display_lines(messages: &[Message]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for msg in messages {
        let (label, text_style, is_user) = match msg.role {
            TranscriptRole::User => (USER_LABEL, Style::default().fg(Color::Cyan), true),
            TranscriptRole::Assistant => {
                (ASSISTANT_LABEL, Style::default().fg(Color::White), false)
            }
        };

        let meta = Line::from(Span::styled(
            format!("{label} • {}", msg.display_time()),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ));
        lines.push(align(meta, is_user));

        for content_line in msg.content.lines() {
            let line = Line::from(Span::styled(content_line.to_string(), text_style));
            lines.push(align(line, is_user));
        }
        lines.push(Line::from(""));
    }

    lines
}

fn align(line: Line<'static>, right: bool) -> Line<'static> {
    if right {
        line.right_aligned()
    } else {
        line.left_aligned()
    }
}

/// Rows the lines occupy once wrapped to `width` columns.
pub fn wrapped_line_count(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let total: usize = lines
        .iter()
        .map(|line| {
            let line_width: usize = line
                .spans
                .iter()
                .map(|span| UnicodeWidthStr::width(span.content.as_ref()))
                .sum();
            line_width.div_ceil(width).max(1)
        })
        .sum();
    u16::try_from(total).unwrap_or(u16::MAX)
}

pub struct ScreenLayout {
    pub transcript: Rect,
    pub input: Rect,
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);
    ScreenLayout {
        transcript: chunks[0],
        input: chunks[1],
    }
}

/// Largest scroll-up offset for the transcript area.
pub fn max_scroll_offset(messages: &[Message], transcript: Rect) -> u16 {
    let lines = build_display_lines(messages);
    let available_height = transcript.height.saturating_sub(1);
    wrapped_line_count(&lines, transcript.width).saturating_sub(available_height)
}

pub fn ui(f: &mut Frame, messages: &[Message], view: &mut ChatView, title: &str) {
    let layout = screen_layout(f.area());

    let lines = build_display_lines(messages);
    let available_height = layout.transcript.height.saturating_sub(1); // title row
    let max_offset =
        wrapped_line_count(&lines, layout.transcript.width).saturating_sub(available_height);
    let from_bottom = view.scroll_from_bottom.min(max_offset);
    let scroll_offset = max_offset - from_bottom;

    let transcript = Paragraph::new(lines)
        .block(Block::default().title(title.to_string()))
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, layout.transcript);

    let input_title = match (view.pending_symbol(Instant::now()), view.status.as_deref()) {
        (Some(symbol), _) => format!("{symbol} Waiting for reply..."),
        (None, Some(status)) => status.to_string(),
        (None, None) => "Type your message (Enter to send, Ctrl+C to quit)".to_string(),
    };
    let border_style = if view.is_pending() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };
    view.input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(input_title),
    );
    f.render_widget(&view.input, layout.input);
}
