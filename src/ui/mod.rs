//! Full-screen ratatui front-end: main menu, smart commit, todos and the
//! terminal test, all driven from one event loop.

mod app;
mod commit;
pub mod keys;
mod menu;
mod run;
#[cfg(test)]
mod test_support;
mod text_input;
pub mod theme;
mod todo;

pub use app::{App, RepoInfo, Runtime, Services, Transition, POLL_CAP};
pub use commit::{commit_script, parse_commit_message};
pub use menu::format_time_ago;
pub use run::run_app;
pub use text_input::TextBuffer;
