use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

/// Raw mode, alternate screen and mouse capture for as long as this lives.
///
/// Dropping the session restores the terminal on every return path out of
/// `main`. During a panic the hook installed by `ratatui::init` has already
/// restored it, so `Drop` only releases the mouse.
pub struct TerminalSession {
    pub terminal: DefaultTerminal,
}

impl TerminalSession {
    pub fn mount() -> Result<Self> {
        let mut session = Self {
            terminal: ratatui::init(),
        };
        session.terminal.clear()?;
        execute!(std::io::stdout(), EnableMouseCapture)?;
        tracing::debug!("terminal mounted");
        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        if std::thread::panicking() {
            return;
        }
        ratatui::restore();
        tracing::debug!("terminal restored");
    }
}
