//! Raw mode and the alternate screen for the lifetime of the UI.

use std::{
    io::{self, Write},
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        Once,
    },
};

use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

/// Set while raw mode and the alternate screen are on. Both the guard and the
/// panic hook clear it, so the terminal is put back exactly once.
static ACTIVE: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK: Once = Once::new();

/// Holds the terminal in UI mode; dropping it restores the shell's terminal.
pub struct TerminalRestoreGuard {
    _private: (),
}

impl TerminalRestoreGuard {
    pub fn enter(out: &mut impl Write) -> io::Result<Self> {
        install_terminal_panic_hook();
        enable_raw_mode()?;
        ACTIVE.store(true, Ordering::SeqCst);
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            leave();
            return Err(err);
        }
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalRestoreGuard {
    fn drop(&mut self) {
        leave();
    }
}

fn leave() {
    if !ACTIVE.swap(false, Ordering::SeqCst) {
        return;
    }
    if let Err(err) = disable_raw_mode() {
        tracing::warn!(error = %err, "failed to leave raw mode");
    }
    let mut stdout = io::stdout();
    if let Err(err) = execute!(stdout, LeaveAlternateScreen, Show) {
        tracing::warn!(error = %err, "failed to leave alternate screen");
    }
}

/// Put the terminal back before the default hook prints the panic, then log it.
pub fn install_terminal_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            leave();
            crate::logging::log_panic(info);
            previous(info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leave_without_enter_is_a_no_op() {
        assert!(!ACTIVE.load(Ordering::SeqCst));
        leave();
        assert!(!ACTIVE.load(Ordering::SeqCst));
    }
}
