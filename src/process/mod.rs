//! Subprocess execution with line-streamed output.

mod error;
mod runner;
mod sink;

pub use error::{ProcessExitError, SpawnError, StreamReadError};
pub use runner::{
    start, CancelHandle, CommandInvocation, ProcessLauncher, RunningProcess, SystemLauncher,
};
pub use sink::{output_channel, OutputSink, SinkStatus, SinkWriter, StreamKind};

#[cfg(test)]
pub(crate) use runner::build_test_process;
