use std::{io, path::PathBuf, process::ExitStatus};
use thiserror::Error;

use super::sink::StreamKind;

/// Errors surfaced synchronously when a subprocess cannot be started.
/// No output is ever produced for an invocation that fails this way.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("no program to run")]
    EmptyProgram,
    #[error("{program}: executable file not found")]
    NotFound { program: String },
    #[error("working directory {} is not accessible", dir.display())]
    WorkingDir { dir: PathBuf },
    #[error("failed to start {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl SpawnError {
    pub(super) fn from_io(program: &str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                program: program.to_string(),
            }
        } else {
            Self::Launch {
                program: program.to_string(),
                source: err,
            }
        }
    }
}

/// Terminal error recorded in the sink when the process did not finish cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessExitError {
    #[error("exit status {0}")]
    Status(i32),
    #[error("terminated by signal {0}")]
    Signal(i32),
    #[error("wait failed: {0}")]
    Wait(String),
    #[error("output stream closed before the process was reaped")]
    Disconnected,
}

impl ProcessExitError {
    /// `None` for a zero exit status.
    pub fn from_status(status: ExitStatus) -> Option<Self> {
        if status.success() {
            return None;
        }
        if let Some(code) = status.code() {
            return Some(Self::Status(code));
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Some(Self::Signal(signal));
            }
        }
        Some(Self::Wait(status.to_string()))
    }
}

/// A read failure on one output stream. Soft: logged, and only that stream stops.
#[derive(Debug, Error)]
#[error("reading {stream} failed: {source}")]
pub struct StreamReadError {
    pub stream: StreamKind,
    #[source]
    pub source: io::Error,
}
