//! Terminal modal: runs one command and streams its output into a scrollable
//! overlay until the user closes it.
//!
//! The modal is driven from the UI thread. Every [`Tick`] addressed to the
//! current session folds new output into the display buffer and yields the
//! next tick while the process is running; ticks carrying an older session id
//! are dropped without touching state.

mod display;
pub mod render;
mod session;
mod tick;
mod viewport;

use std::time::Duration;

use crate::config::Keybindings;
use crate::logging::CONTENT_TARGET;
use crate::process::{
    CancelHandle, CommandInvocation, ProcessExitError, ProcessLauncher, RunningProcess, SpawnError,
};

pub use display::{DisplayBuffer, DisplayLine, LineKind, DEFAULT_MAX_LINES, SUCCESS_STATUS};
pub use session::{SessionFactory, SessionId};
pub use tick::{Tick, TickScheduler, DEFAULT_TICK_INTERVAL};
pub use viewport::Viewport;

/// Rows taken by the border, header, separators and footer.
pub const MODAL_CHROME_ROWS: u16 = 6;
/// Columns taken by the border and horizontal padding.
pub const MODAL_CHROME_COLS: u16 = 4;

/// Invoked with the owner's state and the full raw output when the modal closes.
pub type CloseCallback<S> = Box<dyn FnOnce(&mut S, String)>;

/// What closing the modal does to a process that is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseBehavior {
    /// Leave it running; further output is discarded.
    #[default]
    Detach,
    /// Fire the cancellation hook.
    Terminate,
}

#[derive(Debug, Clone)]
pub struct ModalSettings {
    pub tick_interval: Duration,
    pub max_lines: usize,
    pub close_behavior: CloseBehavior,
}

impl Default for ModalSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_lines: DEFAULT_MAX_LINES,
            close_behavior: CloseBehavior::Detach,
        }
    }
}

/// Symbolic modal commands resolved from key strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Addressed to another session; nothing changed.
    Stale,
    /// Still running; schedule this tick next.
    Continue(Tick),
    /// The process finished (or had already finished).
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
    CloseRequested,
}

/// Modal size for a screen: 80% of the width within 60..=120 columns and 70%
/// of the height within 10..=40 rows, never larger than the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalGeometry {
    pub width: u16,
    pub height: u16,
}

impl ModalGeometry {
    pub fn for_screen(screen_width: u16, screen_height: u16) -> Self {
        let width = (u32::from(screen_width) * 8 / 10).clamp(60, 120) as u16;
        let height = (u32::from(screen_height) * 7 / 10).clamp(10, 40) as u16;
        Self {
            width: width.min(screen_width),
            height: height.min(screen_height),
        }
    }

    pub fn content_width(&self) -> usize {
        usize::from(self.width.saturating_sub(MODAL_CHROME_COLS))
    }

    pub fn content_height(&self) -> usize {
        usize::from(self.height.saturating_sub(MODAL_CHROME_ROWS))
    }
}

/// Describes a modal to open: title, command and optional close callback.
pub struct ModalRequest<S> {
    title: String,
    invocation: CommandInvocation,
    on_close: Option<CloseCallback<S>>,
}

impl<S> ModalRequest<S> {
    pub fn new(title: impl Into<String>, invocation: CommandInvocation) -> Self {
        Self {
            title: title.into(),
            invocation,
            on_close: None,
        }
    }

    pub fn on_close(mut self, callback: impl FnOnce(&mut S, String) + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }
}

pub struct TerminalModal<S> {
    session: SessionId,
    title: String,
    command_line: String,
    settings: ModalSettings,
    geometry: ModalGeometry,
    display: DisplayBuffer,
    viewport: Viewport,
    process: RunningProcess,
    running: bool,
    exit_error: Option<ProcessExitError>,
    on_close: Option<CloseCallback<S>>,
}

impl<S> TerminalModal<S> {
    /// Start the command and return the modal with its first tick.
    ///
    /// A spawn failure is returned as-is: no session tick exists and the
    /// request's callback is dropped without being called.
    pub fn open(
        request: ModalRequest<S>,
        sessions: &mut SessionFactory,
        launcher: &dyn ProcessLauncher,
        settings: &ModalSettings,
        screen: (u16, u16),
    ) -> Result<(Self, Tick), SpawnError> {
        let ModalRequest {
            title,
            invocation,
            on_close,
        } = request;
        let session = sessions.next_id();
        let command_line = invocation.display_line();
        let process = match launcher.start(invocation) {
            Ok(process) => process,
            Err(err) => {
                tracing::warn!(session = session.get(), error = %err, "modal spawn failed");
                return Err(err);
            }
        };
        tracing::debug!(session = session.get(), pid = process.pid(), "modal opened");

        let geometry = ModalGeometry::for_screen(screen.0, screen.1);
        let display = DisplayBuffer::new(&command_line, settings.max_lines);
        let mut viewport = Viewport::new(geometry.content_width(), geometry.content_height());
        viewport.set_line_count(display.len());

        let modal = Self {
            session,
            title,
            command_line,
            settings: settings.clone(),
            geometry,
            display,
            viewport,
            process,
            running: true,
            exit_error: None,
            on_close,
        };
        Ok((modal, Tick::now(session)))
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn exit_error(&self) -> Option<&ProcessExitError> {
        self.exit_error.as_ref()
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn geometry(&self) -> ModalGeometry {
        self.geometry
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.process.cancel_handle()
    }

    /// Raw output accumulated so far, lines joined with `\n`.
    pub fn raw_output(&mut self) -> String {
        self.process.raw_output()
    }

    pub fn handle_tick(&mut self, tick: Tick) -> TickOutcome {
        if tick.session != self.session {
            return TickOutcome::Stale;
        }
        if !self.running {
            return TickOutcome::Finished;
        }

        self.process.poll();
        self.display.rebuild(self.process.sink().lines());
        let status = self.process.status();
        if status.done {
            self.running = false;
            self.exit_error = status.error;
            self.display.finish(self.exit_error.as_ref());
        }
        self.viewport.set_line_count(self.display.len());

        if self.running {
            TickOutcome::Continue(Tick::after(self.session, self.settings.tick_interval))
        } else {
            TickOutcome::Finished
        }
    }

    pub fn handle_key(&mut self, key: &str, keys: &Keybindings) -> KeyOutcome {
        match keys.modal_action(key) {
            Some(action) => self.apply(action),
            None => KeyOutcome::Ignored,
        }
    }

    pub fn apply(&mut self, action: ModalAction) -> KeyOutcome {
        match action {
            ModalAction::ScrollUp => self.viewport.scroll_up(),
            ModalAction::ScrollDown => self.viewport.scroll_down(),
            ModalAction::PageUp => self.viewport.page_up(),
            ModalAction::PageDown => self.viewport.page_down(),
            ModalAction::Top => self.viewport.jump_top(),
            ModalAction::Bottom => self.viewport.jump_bottom(),
            ModalAction::Close => return KeyOutcome::CloseRequested,
        }
        KeyOutcome::Handled
    }

    pub fn resize(&mut self, screen_width: u16, screen_height: u16) {
        self.geometry = ModalGeometry::for_screen(screen_width, screen_height);
        self.viewport
            .resize(self.geometry.content_width(), self.geometry.content_height());
    }

    /// Tear the modal down and hand back its output and callback.
    pub fn close(mut self) -> ClosedModal<S> {
        let raw_output = self.process.raw_output();
        if self.running && self.settings.close_behavior == CloseBehavior::Terminate {
            self.process.cancel_handle().cancel();
        }
        tracing::debug!(
            session = self.session.get(),
            running = self.running,
            "modal closed"
        );
        tracing::debug!(
            target: CONTENT_TARGET,
            session = self.session.get(),
            output = %raw_output,
            "modal output"
        );
        ClosedModal {
            session: self.session,
            raw_output,
            exit_error: self.exit_error,
            was_running: self.running,
            callback: self.on_close.take(),
        }
    }
}

/// Result of closing a modal. The callback runs at most once, on `deliver`.
pub struct ClosedModal<S> {
    pub session: SessionId,
    pub raw_output: String,
    pub exit_error: Option<ProcessExitError>,
    pub was_running: bool,
    callback: Option<CloseCallback<S>>,
}

impl<S> ClosedModal<S> {
    #[cfg(test)]
    pub(crate) fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Run the close callback against `state`. Returns whether one was set.
    pub fn deliver(self, state: &mut S) -> bool {
        match self.callback {
            Some(callback) => {
                callback(state, self.raw_output);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests;
