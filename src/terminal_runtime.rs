use std::io;
use std::panic;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::{cell_count, GridSize, CELL_HEIGHT, CELL_WIDTH, HUD_ROWS};

/// Concrete terminal type used by the game loop.
pub type AppTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Owns the terminal for one game run: raw mode, the alternate screen, the
/// play-grid geometry, and the warnings that have to wait for the shell to
/// come back.
///
/// While the alternate screen is up, stderr is invisible and raw mode would
/// garble it anyway; [`TerminalSession::defer_warning`] queues messages and
/// `Drop` prints them right after restoring the terminal. `enter` also
/// chains a panic hook onto the existing one so a panic mid-frame restores
/// the shell before the panic report prints.
pub struct TerminalSession {
    terminal: AppTerminal,
    deferred: Vec<String>,
}

impl TerminalSession {
    /// Enters raw mode and the alternate screen, installs the restoring
    /// panic hook, and creates the ratatui terminal.
    pub fn enter() -> io::Result<Self> {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            default_hook(panic_info);
        }));

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(error) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(error);
        }

        let backend = CrosstermBackend::new(stdout);
        match Terminal::new(backend) {
            Ok(terminal) => Ok(Self {
                terminal,
                deferred: Vec::new(),
            }),
            Err(error) => {
                restore_terminal();
                Err(error)
            }
        }
    }

    /// Returns mutable access to the inner ratatui terminal.
    pub fn terminal_mut(&mut self) -> &mut AppTerminal {
        &mut self.terminal
    }

    /// Returns the cell grid that fits the current viewport.
    pub fn play_grid(&self) -> io::Result<GridSize> {
        let viewport = self.terminal.size()?;
        Ok(grid_for_viewport(viewport.width, viewport.height))
    }

    /// Queues a message to print on stderr once the terminal is restored.
    pub fn defer_warning(&mut self, message: impl Into<String>) {
        self.deferred.push(message.into());
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore_terminal();
        for warning in self.deferred.drain(..) {
            eprintln!("{warning}");
        }
    }
}

/// Converts a terminal viewport into the play grid, reserving one border
/// cell on each side and the HUD rows at the bottom.
fn grid_for_viewport(width: u16, height: u16) -> GridSize {
    cell_count(
        width.saturating_sub(2),
        height.saturating_sub(HUD_ROWS + 2),
        CELL_WIDTH,
        CELL_HEIGHT,
    )
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, Show, LeaveAlternateScreen);
}
