//! Application state: the active view, the shared services every view uses,
//! and the modal runtime (session ids, pending ticks, screen size).

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::event::KeyEvent;
use ratatui::Frame;

use super::commit::CommitFlow;
use super::keys::key_string;
use super::menu::{draw_menu, MainMenu, MenuItem, MenuOutcome};
use super::todo::TodoScreen;
use crate::config::{Keybindings, StartView};
use crate::git::{Git, Repo};
use crate::modal::{
    render::draw_modal, KeyOutcome, ModalRequest, ModalSettings, SessionFactory, TerminalModal,
    Tick, TickOutcome, TickScheduler, DEFAULT_TICK_INTERVAL,
};
use crate::process::{CommandInvocation, ProcessLauncher, SpawnError};
use crate::store::{RepoState, Store};

/// Longest the input poll may block, so background work is picked up promptly.
pub const POLL_CAP: Duration = Duration::from_millis(250);

const TERMINAL_TEST_TITLE: &str = "Git Status Loop (0.5s)";
const TERMINAL_TEST_SCRIPT: &str = "for i in $(seq 1 20); do echo \"=== Run $i at $(date +%H:%M:%S) ===\"; git status --short; echo \"\"; sleep 0.5; done; echo \"Done!\"";

/// Collaborators shared by every view.
pub struct Services {
    pub keys: Keybindings,
    pub store: Store,
    pub git: Git,
    pub launcher: Arc<dyn ProcessLauncher>,
    pub settings: ModalSettings,
    pub claude_cmd: String,
    pub shell_cmd: String,
}

/// Modal bookkeeping owned by the UI thread.
pub struct Runtime {
    sessions: SessionFactory,
    ticks: TickScheduler,
    screen: (u16, u16),
}

impl Runtime {
    pub fn new(screen: (u16, u16)) -> Self {
        Self {
            sessions: SessionFactory::new(),
            ticks: TickScheduler::new(),
            screen,
        }
    }

    pub fn screen(&self) -> (u16, u16) {
        self.screen
    }

    pub fn pending_ticks(&self) -> usize {
        self.ticks.len()
    }

    pub fn take_due(&mut self, now: Instant) -> Vec<Tick> {
        self.ticks.take_due(now)
    }

    /// Start a modal sized for the current screen and schedule its first tick.
    pub fn open_modal<S>(
        &mut self,
        services: &Services,
        request: ModalRequest<S>,
    ) -> Result<TerminalModal<S>, SpawnError> {
        let (modal, tick) = TerminalModal::open(
            request,
            &mut self.sessions,
            services.launcher.as_ref(),
            &services.settings,
            self.screen,
        )?;
        self.ticks.schedule(tick);
        Ok(modal)
    }

    /// Schedule the follow-up tick, if any. Returns whether the modal changed.
    pub fn follow(&mut self, outcome: TickOutcome) -> bool {
        match outcome {
            TickOutcome::Continue(next) => {
                self.ticks.schedule(next);
                true
            }
            TickOutcome::Finished => true,
            TickOutcome::Stale => false,
        }
    }
}

/// What a view asks the shell to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    ToMenu,
}

/// The current repository as shown on the main menu.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    pub repo: Repo,
    /// State from before this launch touched it.
    pub last_opened: Option<RepoState>,
    pub ahead: u32,
    pub behind: u32,
    pub has_changes: bool,
}

impl RepoInfo {
    /// Record the visit in the store and collect git status. Failures degrade
    /// to empty values; none of them prevent startup.
    pub fn gather(repo: Repo, store: &Store, git: &Git) -> Self {
        let last_opened = match store.touch_repo(&repo.root_str(), &repo.name) {
            Ok((previous, _)) => previous,
            Err(err) => {
                tracing::warn!(repo = %repo.name, error = %err, "failed to record repo visit");
                None
            }
        };
        let (ahead, behind) = git.ahead_behind(&repo.root).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "ahead/behind unavailable");
            (0, 0)
        });
        let has_changes = git.has_local_changes(&repo.root).unwrap_or(false);
        Self {
            repo,
            last_opened,
            ahead,
            behind,
            has_changes,
        }
    }
}

enum View {
    MainMenu,
    TerminalTest(TerminalModal<()>),
    Commit(CommitFlow),
    Todos(TodoScreen),
}

pub struct App {
    services: Services,
    runtime: Runtime,
    repo: Option<RepoInfo>,
    menu: MainMenu,
    view: View,
    should_quit: bool,
}

impl App {
    pub fn new(services: Services, repo: Option<RepoInfo>, start: StartView, screen: (u16, u16)) -> Self {
        let mut app = Self {
            services,
            runtime: Runtime::new(screen),
            repo,
            menu: MainMenu::new(),
            view: View::MainMenu,
            should_quit: false,
        };
        if start == StartView::Todo {
            app.open(MenuItem::Todos);
        }
        app
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn view_name(&self) -> &'static str {
        match self.view {
            View::MainMenu => "menu",
            View::TerminalTest(_) => "terminal_test",
            View::Commit(_) => "commit",
            View::Todos(_) => "todos",
        }
    }

    pub fn menu(&self) -> &MainMenu {
        &self.menu
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Replace the active view, tearing the old one down.
    fn set_view(&mut self, view: View) {
        match std::mem::replace(&mut self.view, view) {
            View::MainMenu => {}
            View::TerminalTest(modal) => {
                modal.close();
            }
            View::Commit(flow) => flow.dispose(),
            View::Todos(screen) => screen.dispose(),
        }
    }

    fn back_to_menu(&mut self) {
        self.set_view(View::MainMenu);
    }

    fn open(&mut self, item: MenuItem) {
        if item.is_placeholder() {
            self.menu.set_notice(format!("{} is coming soon", item.label()));
            return;
        }
        let Some(info) = &self.repo else {
            if item.needs_repo() {
                self.menu.set_notice("Not in a git repository");
            }
            return;
        };
        let root = info.repo.root.clone();
        let view = match item {
            MenuItem::Todos => View::Todos(TodoScreen::open(&info.repo, &self.services.store)),
            MenuItem::SmartCommit => View::Commit(CommitFlow::start(root, self.services.git.clone())),
            MenuItem::TerminalTest => {
                let invocation =
                    CommandInvocation::new(self.services.shell_cmd.as_str(), ["-c", TERMINAL_TEST_SCRIPT])
                        .in_dir(root);
                let request = ModalRequest::new(TERMINAL_TEST_TITLE, invocation);
                match self.runtime.open_modal(&self.services, request) {
                    Ok(modal) => View::TerminalTest(modal),
                    Err(err) => {
                        self.menu.set_notice(format!("Failed to start: {err}"));
                        return;
                    }
                }
            }
            _ => return,
        };
        tracing::debug!(item = item.label(), "view opened");
        self.set_view(view);
    }

    pub fn handle_key(&mut self, event: &KeyEvent) {
        let key = key_string(event);
        if key.is_empty() {
            return;
        }
        if key == "ctrl+c" {
            self.should_quit = true;
            return;
        }
        self.handle_key_str(&key);
    }

    pub fn handle_key_str(&mut self, key: &str) {
        if let View::MainMenu = self.view {
            match self.menu.handle_key(key, &self.services.keys) {
                MenuOutcome::None => {}
                MenuOutcome::Quit => self.should_quit = true,
                MenuOutcome::Open(item) => self.open(item),
            }
            return;
        }
        let transition = match &mut self.view {
            View::MainMenu => Transition::Stay,
            View::TerminalTest(modal) => match modal.handle_key(key, &self.services.keys) {
                KeyOutcome::CloseRequested => Transition::ToMenu,
                KeyOutcome::Handled | KeyOutcome::Ignored => Transition::Stay,
            },
            View::Commit(flow) => flow.handle_key(key, &self.services, &mut self.runtime),
            View::Todos(screen) => screen.handle_key(key, &self.services, &mut self.runtime),
        };
        if transition == Transition::ToMenu {
            self.back_to_menu();
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.runtime.screen = (width, height);
        match &mut self.view {
            View::MainMenu => {}
            View::TerminalTest(modal) => modal.resize(width, height),
            View::Commit(flow) => flow.resize(width, height),
            View::Todos(screen) => screen.resize(width, height),
        }
    }

    /// Deliver every tick due at `now` to the active view. Ticks for a
    /// session that is no longer shown are dropped. Returns whether to redraw.
    pub fn handle_due_ticks(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for tick in self.runtime.take_due(now) {
            changed |= match &mut self.view {
                View::MainMenu => false,
                View::TerminalTest(modal) => {
                    let outcome = modal.handle_tick(tick);
                    self.runtime.follow(outcome)
                }
                View::Commit(flow) => flow.handle_tick(tick, &mut self.runtime),
                View::Todos(screen) => screen.handle_tick(tick, &mut self.runtime),
            };
        }
        changed
    }

    /// Pick up work finished off the UI thread. Returns whether to redraw.
    pub fn poll_background(&mut self) -> bool {
        match &mut self.view {
            View::Commit(flow) => flow.poll_background(&self.services, &mut self.runtime),
            _ => false,
        }
    }

    pub fn poll_timeout(&self, now: Instant) -> Duration {
        let cap = match &self.view {
            View::Commit(flow) if flow.is_checking() => DEFAULT_TICK_INTERVAL,
            _ => POLL_CAP,
        };
        self.runtime.ticks.poll_timeout(now, cap)
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let area = frame.size();
        let keys = &self.services.keys;
        match &self.view {
            View::MainMenu => draw_menu(frame, area, &self.menu, self.repo.as_ref(), keys),
            View::TerminalTest(modal) => {
                draw_menu(frame, area, &self.menu, self.repo.as_ref(), keys);
                draw_modal(frame, modal, &keys.modal_hint());
            }
            View::Commit(flow) => flow.draw(frame, area, keys),
            View::Todos(screen) => screen.draw(frame, area, keys),
        }
    }

    /// Close whatever is open before the terminal is restored.
    pub fn shutdown(&mut self) {
        self.back_to_menu();
        tracing::debug!(view = self.view_name(), "app shutdown");
    }
}
