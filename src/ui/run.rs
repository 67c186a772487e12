use std::io;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};

use super::app::App;
use crate::terminal_restore::TerminalRestoreGuard;

/// Configure the terminal, run the drawing loop, and tear everything down.
pub fn run_app(app: &mut App) -> Result<()> {
    let mut stdout = io::stdout();
    let guard = TerminalRestoreGuard::enter(&mut stdout).context("failed to set up terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    if let Ok(size) = terminal.size() {
        app.handle_resize(size.width, size.height);
    }

    let result = app_loop(&mut terminal, app);

    app.shutdown();
    drop(terminal);
    drop(guard);

    result
}

fn app_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| app.draw(frame))?;

    loop {
        let mut should_draw = app.poll_background();
        should_draw |= app.handle_due_ticks(Instant::now());

        if event::poll(app.poll_timeout(Instant::now()))? {
            match event::read()? {
                // Release events would repeat every key on terminals that report them.
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    tracing::trace!(code = ?key.code, modifiers = ?key.modifiers, view = app.view_name(), "key");
                    app.handle_key(&key);
                    should_draw = true;
                }
                Event::Resize(width, height) => {
                    app.handle_resize(width, height);
                    should_draw = true;
                }
                _ => {}
            }
        }

        if app.should_quit() {
            break;
        }
        if should_draw {
            terminal.draw(|frame| app.draw(frame))?;
        }
    }
    Ok(())
}
