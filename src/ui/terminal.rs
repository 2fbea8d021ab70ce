//! Terminal driver for the form
//!
//! crossterm supplies key events, ratatui draws. Redraws happen on every key
//! and every published view change.

use super::draw;
use crate::input::QueryInput;
use crate::runtime::{RuntimeError, SubmissionHandle};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout, Stdout};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// What a key press asks the form to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    None,
    Submit,
    Reset,
    Quit,
}

/// Apply a key to the query and report the resulting action
fn handle_key(key: KeyEvent, input: &mut QueryInput) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let quit = key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c'));
    if quit {
        return KeyAction::Quit;
    }

    let newline = (alt && key.code == KeyCode::Enter) || (ctrl && key.code == KeyCode::Char('j'));
    if newline {
        input.push_char('\n');
        return KeyAction::None;
    }

    match key.code {
        KeyCode::Char('r') if ctrl => KeyAction::Reset,
        // Blank queries never fire
        KeyCode::Enter if input.is_submittable() => KeyAction::Submit,
        KeyCode::Backspace => {
            input.pop_char();
            KeyAction::None
        }
        KeyCode::Char(c) if !ctrl => {
            input.push_char(c);
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

/// Raw-mode alternate screen, restored on drop
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self, UiError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

/// Run the interactive form until the user quits
pub async fn run(handle: &SubmissionHandle) -> Result<(), UiError> {
    let mut guard = TerminalGuard::new()?;
    let mut events = EventStream::new();
    let mut view_rx = handle.watch();
    let mut input = QueryInput::new();

    loop {
        let view = view_rx.borrow_and_update().clone();
        guard.terminal.draw(|frame| draw(frame, &input, &view))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match handle_key(key, &mut input) {
                        KeyAction::Quit => break,
                        KeyAction::Submit => handle.submit(input.query()).await?,
                        KeyAction::Reset => {
                            input.clear();
                            handle.reset().await?;
                        }
                        KeyAction::None => {}
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(UiError::Io(e)),
                None => break,
            },
            changed = view_rx.changed() => {
                if changed.is_err() {
                    tracing::warn!("Submission runtime stopped");
                    break;
                }
            }
        }
    }

    Ok(())
}
