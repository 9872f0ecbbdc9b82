//! Presentation state for the chat screen.

use std::time::Instant;

use tui_textarea::TextArea;

pub struct ChatView {
    pub input: TextArea<'static>,
    /// Rows scrolled up from the newest message; 0 follows the bottom.
    pub scroll_from_bottom: u16,
    /// Set while a reply is being produced.
    pub pending_since: Option<Instant>,
    pub status: Option<String>,
    /// Title suffix describing where replies come from.
    pub mode_label: String,
}

impl ChatView {
    pub fn new(mode_label: impl Into<String>) -> Self {
        Self {
            input: new_input(),
            scroll_from_bottom: 0,
            pending_since: None,
            status: None,
            mode_label: mode_label.into(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Trimmed input text; `None` when there is nothing to send.
    pub fn input_text(&self) -> Option<String> {
        let text = self.input.lines().join("\n");
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn clear_input(&mut self) {
        self.input = new_input();
    }

    pub fn scroll_up(&mut self, rows: u16, max_offset: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(rows).min(max_offset);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(rows);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }

    /// Pulse symbol for the pending indicator.
    pub fn pending_symbol(&self, now: Instant) -> Option<&'static str> {
        let started = self.pending_since?;
        let elapsed = now.saturating_duration_since(started).as_millis() as f32 / 1000.0;
        let phase = (elapsed * 2.0) % 2.0;
        let intensity = if phase < 1.0 { phase } else { 2.0 - phase };
        Some(if intensity < 0.33 {
            "○"
        } else if intensity < 0.66 {
            "◐"
        } else {
            "●"
        })
    }
}

fn new_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_placeholder_text("Type here...");
    input
}
