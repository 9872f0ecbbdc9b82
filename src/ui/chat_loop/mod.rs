//! Main chat event loop
//!
//! Draws the transcript, feeds key presses into the input box and runs one
//! turn per submission. The reply is produced on a worker task while the
//! loop keeps redrawing a pending indicator; input is refused until the
//! reply has been recorded.

pub mod lifecycle;

use std::error::Error;
use std::time::Duration;

use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind,
};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::core::config::Config;
use crate::core::dispatcher::{worker_failure_reply, TurnError};
use crate::core::session::{ChatSession, SessionOptions};
use crate::ui::chat_loop::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};
use crate::ui::renderer::{max_scroll_offset, screen_layout, ui};
use crate::ui::view::ChatView;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, PartialEq, Eq)]
enum LoopAction {
    Continue,
    Submit(String),
    Quit,
}

pub async fn run_chat(config: &Config, options: SessionOptions) -> Result<(), Box<dyn Error>> {
    let mut session = ChatSession::new(config, options)?;
    let mode_label = if session.dispatcher.has_credential() {
        format!("{} ({})", session.settings.backend_name, session.settings.model)
    } else {
        "demo mode, no API key".to_string()
    };
    let mut view = ChatView::new(mode_label);

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut session, &mut view).await;
    restore_terminal(&mut terminal)?;
    result
}

fn title(session: &ChatSession, view: &ChatView) -> String {
    format!(
        "Omnichat v{} - {} • Logging: {}",
        env!("CARGO_PKG_VERSION"),
        view.mode_label,
        session.logging_status()
    )
}

async fn event_loop(
    terminal: &mut ChatTerminal,
    session: &mut ChatSession,
    view: &mut ChatView,
) -> Result<(), Box<dyn Error>> {
    let mut worker: Option<JoinHandle<String>> = None;

    loop {
        if worker.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(handle) = worker.take() {
                let reply = match handle.await {
                    Ok(reply) => reply,
                    Err(err) => {
                        tracing::error!(error = %err, "reply worker failed");
                        worker_failure_reply(session.dispatcher.backend_name(), &err)
                    }
                };
                if let Err(err) = session.finish_turn(reply) {
                    view.status = Some(format!("Could not record reply: {err}"));
                }
                view.pending_since = None;
                view.scroll_to_bottom();
            }
        }

        let header = title(session, view);
        terminal.draw(|f| ui(f, session.store.all(), view, &header))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        let size = terminal.size()?;
        let transcript_area = screen_layout(Rect::new(0, 0, size.width, size.height)).transcript;
        let max_offset = max_scroll_offset(session.store.all(), transcript_area);

        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                handle_key(view, key, max_offset)
            }
            Event::Mouse(mouse) => {
                match mouse.kind {
                    MouseEventKind::ScrollUp => view.scroll_up(3, max_offset),
                    MouseEventKind::ScrollDown => view.scroll_down(3),
                    _ => {}
                }
                LoopAction::Continue
            }
            Event::Paste(text) => {
                if !view.is_pending() {
                    view.input.insert_str(text.replace(['\r', '\n'], " "));
                }
                LoopAction::Continue
            }
            _ => LoopAction::Continue,
        };

        match action {
            LoopAction::Quit => return Ok(()),
            LoopAction::Continue => {}
            LoopAction::Submit(text) => match session.begin_turn(&text) {
                Ok(pending) => {
                    view.clear_input();
                    view.status = None;
                    view.scroll_to_bottom();
                    view.pending_since = Some(std::time::Instant::now());
                    worker = Some(tokio::spawn(pending.resolve()));
                }
                Err(TurnError::EmptyInput) => {}
                Err(err) => view.status = Some(err.to_string()),
            },
        }
    }
}

fn handle_key(view: &mut ChatView, key: KeyEvent, max_offset: u16) -> LoopAction {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => LoopAction::Quit,
        KeyCode::Up => {
            view.scroll_up(1, max_offset);
            LoopAction::Continue
        }
        KeyCode::Down => {
            view.scroll_down(1);
            LoopAction::Continue
        }
        KeyCode::PageUp => {
            view.scroll_up(10, max_offset);
            LoopAction::Continue
        }
        KeyCode::PageDown => {
            view.scroll_down(10);
            LoopAction::Continue
        }
        // One turn at a time: ignore input until the reply lands.
        _ if view.is_pending() => LoopAction::Continue,
        KeyCode::Enter => match view.input_text() {
            Some(text) => LoopAction::Submit(text),
            None => LoopAction::Continue,
        },
        _ => {
            view.input.input(key);
            LoopAction::Continue
        }
    }
}
