use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stdout, stdout};

use crate::error::Result;

pub type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Raw-mode alternate screen, restored when dropped so an early return or a
/// failed request never leaves the shell unusable.
pub struct TerminalSession {
    pub terminal: AppTerminal,
}

impl TerminalSession {
    pub fn start() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        crossterm::execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            tracing::error!("failed to disable raw mode: {err}");
        }
        if let Err(err) = crossterm::execute!(self.terminal.backend_mut(), LeaveAlternateScreen) {
            tracing::error!("failed to leave alternate screen: {err}");
        }
        let _ = self.terminal.show_cursor();
    }
}
