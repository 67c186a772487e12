pub mod config;
pub mod git;
mod logging;
pub mod modal;
pub mod process;
pub mod store;
pub mod terminal_restore;
pub mod todo;
pub mod ui;
pub mod utf8_safe;

pub use logging::{init_logging, log_file_path, LogSettings, CONTENT_TARGET};
