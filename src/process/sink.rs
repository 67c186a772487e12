//! Output sink: an append-only line log fed by reader threads.
//!
//! Reader threads hold a [`SinkWriter`] and push lines into a mailbox; the UI
//! thread owns the [`OutputSink`] and folds the mailbox into its line list
//! whenever it polls. Nothing is shared behind a lock.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::fmt;

use super::error::ProcessExitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn label(self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
enum SinkMessage {
    Line { stream: StreamKind, text: String },
    Done(Option<ProcessExitError>),
}

/// Write half of an output sink. Cheap to clone; one copy per reader thread.
#[derive(Debug, Clone)]
pub struct SinkWriter {
    tx: Sender<SinkMessage>,
}

impl SinkWriter {
    /// Queue one line. Returns `false` once the read half has been dropped.
    pub fn append(&self, stream: StreamKind, line: impl Into<String>) -> bool {
        self.tx
            .send(SinkMessage::Line {
                stream,
                text: line.into(),
            })
            .is_ok()
    }

    /// Record completion. Only the first call is honoured by the reader.
    pub fn mark_done(&self, error: Option<ProcessExitError>) {
        let _ = self.tx.send(SinkMessage::Done(error));
    }
}

/// Completion state as seen by the UI after the last poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkStatus {
    pub done: bool,
    pub error: Option<ProcessExitError>,
}

/// Read half of an output sink, owned by the UI thread.
#[derive(Debug)]
pub struct OutputSink {
    rx: Receiver<SinkMessage>,
    lines: Vec<String>,
    stderr_lines: usize,
    status: SinkStatus,
}

/// Create a connected writer/sink pair.
pub fn output_channel() -> (SinkWriter, OutputSink) {
    let (tx, rx) = unbounded();
    let sink = OutputSink {
        rx,
        lines: Vec::new(),
        stderr_lines: 0,
        status: SinkStatus::default(),
    };
    (SinkWriter { tx }, sink)
}

impl OutputSink {
    /// Drain queued messages without blocking. Returns the number of lines added.
    pub fn poll(&mut self) -> usize {
        let mut added = 0;
        loop {
            match self.rx.try_recv() {
                Ok(SinkMessage::Line { stream, text }) => {
                    if self.status.done {
                        continue;
                    }
                    if stream == StreamKind::Stderr {
                        self.stderr_lines += 1;
                    }
                    self.lines.push(text);
                    added += 1;
                }
                Ok(SinkMessage::Done(error)) => {
                    if !self.status.done {
                        self.status = SinkStatus { done: true, error };
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.status.done {
                        self.status = SinkStatus {
                            done: true,
                            error: Some(ProcessExitError::Disconnected),
                        };
                    }
                    break;
                }
            }
        }
        added
    }

    /// Lines accumulated up to the last poll, in arrival order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Poll, then return an independent copy of every line so far.
    pub fn snapshot(&mut self) -> Vec<String> {
        self.poll();
        self.lines.clone()
    }

    /// Completion state as of the last poll. Lines are always folded in
    /// before the completion marker, so a `done` status implies the line
    /// list is final.
    pub fn status(&self) -> SinkStatus {
        self.status.clone()
    }

    pub fn is_done(&self) -> bool {
        self.status.done
    }

    pub fn stderr_line_count(&self) -> usize {
        self.stderr_lines
    }

    /// Poll, then join every line with `\n`.
    pub fn raw_output(&mut self) -> String {
        self.poll();
        self.lines.join("\n")
    }
}
