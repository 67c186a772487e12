//! File logging for the TUI.
//!
//! The UI owns stdout, so diagnostics go to a JSON-lines file through a
//! single `tracing` subscriber. Events under [`CONTENT_TARGET`] carry user
//! text (command output, prompts, commit messages) and are dropped unless
//! `--log-content` is set.

use std::{
    env,
    fs::{self, File, OpenOptions},
    io,
    panic::PanicHookInfo,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{Metadata, Subscriber};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{time::UtcTime, MakeWriter},
    layer::SubscriberExt,
    Layer,
};

use crate::config::AppConfig;

/// Target for events whose fields hold user content.
pub const CONTENT_TARGET: &str = "devdeck::content";

/// The log file starts over once it grows past this on startup.
const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub enabled: bool,
    pub content: bool,
}

impl LogSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let enabled = config.logging_enabled();
        Self {
            enabled,
            content: enabled && config.log_content,
        }
    }
}

/// `$DEVDECK_LOG_FILE`, or `devdeck.jsonl` in the temp dir.
pub fn log_file_path() -> PathBuf {
    env::var_os("DEVDECK_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("devdeck.jsonl"))
}

fn keeps(meta: &Metadata<'_>, content: bool) -> bool {
    content || meta.target() != CONTENT_TARGET
}

pub(crate) fn subscriber<W>(writer: W, settings: LogSettings) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let content = settings.content;
    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(writer)
        .with_current_span(false)
        .with_span_list(false)
        .with_filter(filter_fn(move |meta| keeps(meta, content)));
    tracing_subscriber::registry().with(layer)
}

fn open_log_file(path: &Path) -> io::Result<File> {
    let oversized = fs::metadata(path)
        .map(|meta| meta.len() > LOG_MAX_BYTES)
        .unwrap_or(false);
    let mut options = OpenOptions::new();
    options.create(true);
    if oversized {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    options.open(path)
}

/// Install the global subscriber when `--logs` is active. Returns the log
/// path when logging was set up.
pub fn init_logging(config: &AppConfig) -> Option<PathBuf> {
    let settings = LogSettings::from_config(config);
    if !settings.enabled {
        return None;
    }
    let path = log_file_path();
    let file = match open_log_file(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("devdeck: logging disabled, cannot open {}: {err}", path.display());
            return None;
        }
    };
    tracing::subscriber::set_global_default(subscriber(Mutex::new(file), settings)).ok()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        content = settings.content,
        "logging started"
    );
    Some(path)
}

/// Record a panic. The payload may quote user input, so it goes to the
/// content target.
pub fn log_panic(info: &PanicHookInfo<'_>) {
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    tracing::error!(location = %location, version = env!("CARGO_PKG_VERSION"), "panic");

    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned());
    if let Some(payload) = payload {
        tracing::error!(target: CONTENT_TARGET, payload = %payload, "panic payload");
    }
}
