//! # Terminal adapter
//!
//! The ratatui/crossterm layer. It owns the terminal for the duration of a
//! session, renders [`View`]s and turns key presses into session events.
//! This is the only module that knows about ratatui and crossterm.

mod event;
mod ui;

pub use event::{map_key, TerminalEvents};

use log::info;
use ratatui::DefaultTerminal;

use crate::error::Result;
use crate::session::{self, Renderer, Session, StatusInfo, View};
use crate::tree::Tree;

/// Draws session views into the real terminal
pub struct TerminalRenderer<'a> {
    terminal: &'a mut DefaultTerminal,
}

impl<'a> TerminalRenderer<'a> {
    pub fn new(terminal: &'a mut DefaultTerminal) -> Self {
        Self { terminal }
    }
}

impl Renderer for TerminalRenderer<'_> {
    fn render(&mut self, view: &View<'_>) -> Result<()> {
        self.terminal.draw(|frame| ui::draw(frame, view))?;
        Ok(())
    }
}

/// Restores the terminal even when the session fails
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

/// Run an interactive session over `tree` in the alternate screen and
/// return it once the user quits or confirms
pub fn run(tree: Tree, status: StatusInfo) -> Result<Session> {
    let mut terminal = ratatui::try_init()?;
    let _guard = TerminalGuard;

    let size = terminal.size()?;
    info!("Terminal is {}x{}", size.width, size.height);

    let mut session = Session::new(tree, status, size.width, size.height);
    let mut renderer = TerminalRenderer::new(&mut terminal);
    let outcome = session::run(&mut session, &mut TerminalEvents, &mut renderer)?;

    info!("Session ended: {:?}", outcome);
    Ok(session)
}
