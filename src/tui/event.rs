use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;

use crate::error::{MkctxError, Result};
use crate::session::{Command, Event, EventSource};

/// Map a key press to a session command
pub fn map_key(key: KeyEvent) -> Option<Command> {
    match (key.modifiers, key.code) {
        // Raw mode swallows SIGINT
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Command::Quit),
        (_, KeyCode::Up) => Some(Command::Up),
        (_, KeyCode::Down) => Some(Command::Down),
        (_, KeyCode::Right) => Some(Command::Expand),
        (_, KeyCode::Left) => Some(Command::Collapse),
        (_, KeyCode::Char(' ')) => Some(Command::Toggle),
        (_, KeyCode::Enter) => Some(Command::Confirm),
        (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => Some(Command::Quit),
        _ => None,
    }
}

/// Blocking crossterm reader yielding only events the session understands
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn next_event(&mut self) -> Result<Event> {
        loop {
            let next = event::read()
                .map_err(|e| MkctxError::EventSource(format!("reading terminal input: {}", e)))?;
            match next {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(command) = map_key(key) {
                        return Ok(Event::Command(command));
                    }
                    debug!("Unmapped key {:?} with modifiers {:?}", key.code, key.modifiers);
                }
                TermEvent::Resize(width, height) => return Ok(Event::Resize { width, height }),
                _ => {}
            }
        }
    }
}
