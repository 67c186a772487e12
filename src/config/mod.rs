//! Command-line parsing, validation and keybinding configuration.

mod keybindings;
#[cfg(test)]
mod tests;
mod validation;

use clap::{Parser, ValueEnum};
use std::{path::PathBuf, time::Duration};

use crate::modal::{CloseBehavior, ModalSettings, DEFAULT_MAX_LINES};
use crate::store::{default_data_dir, StoreError};

pub use keybindings::{
    matches, matches_any, normalize_binding, DetailKeys, EditorKeys, FormKeys, GlobalKeys,
    Keybindings, ListKeys, KEYBINDINGS_FILE,
};

pub const DEFAULT_TICK_MS: u64 = 50;
pub const MIN_TICK_MS: u64 = 10;
pub const MAX_TICK_MS: u64 = 1000;
pub const MIN_MAX_LINES: usize = 10;
pub const MAX_MAX_LINES: usize = 100_000;

/// Screen shown at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StartView {
    /// Main menu
    #[default]
    Menu,
    /// Todo management for the current repository
    #[value(alias = "todos")]
    Todo,
}

/// CLI options for devdeck. Validated values keep spawned subprocesses predictable.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "devdeck",
    about = "devdeck - git workflow deck with a streaming terminal modal",
    author,
    version
)]
pub struct AppConfig {
    /// Screen to open at startup
    #[arg(value_enum, default_value_t = StartView::Menu)]
    pub view: StartView,

    /// Directory for keybindings, repo state and todos (default: ~/.devdeck)
    #[arg(long = "data-dir", env = "DEVDECK_HOME", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Claude CLI binary used for commit messages and prompt improvement
    #[arg(long = "claude-cmd", env = "CLAUDE_CMD", default_value = "claude")]
    pub claude_cmd: String,

    /// git binary
    #[arg(long = "git-cmd", default_value = "git")]
    pub git_cmd: String,

    /// Shell used to run the commit pipeline
    #[arg(long = "shell-cmd", default_value = "bash")]
    pub shell_cmd: String,

    /// Output polling interval for the terminal modal (milliseconds)
    #[arg(long = "tick-ms", default_value_t = DEFAULT_TICK_MS)]
    pub tick_ms: u64,

    /// Maximum lines kept in the terminal modal, header included
    #[arg(long = "max-lines", default_value_t = DEFAULT_MAX_LINES)]
    pub max_lines: usize,

    /// Terminate a still-running command when its modal is closed
    #[arg(long = "kill-on-close", default_value_t = false)]
    pub kill_on_close: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "DEVDECK_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "DEVDECK_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging command output and prompt content (requires --logs)
    #[arg(
        long = "log-content",
        env = "DEVDECK_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

impl AppConfig {
    pub fn logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn close_behavior(&self) -> CloseBehavior {
        if self.kill_on_close {
            CloseBehavior::Terminate
        } else {
            CloseBehavior::Detach
        }
    }

    pub fn modal_settings(&self) -> ModalSettings {
        ModalSettings {
            tick_interval: self.tick_interval(),
            max_lines: self.max_lines,
            close_behavior: self.close_behavior(),
        }
    }

    /// `--data-dir` if given, otherwise `~/.devdeck`.
    pub fn resolved_data_dir(&self) -> Result<PathBuf, StoreError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }
}
