//! Bounded display buffer for the modal.
//!
//! Layout is `["$ <command>", "", <output...>, ["", <status>]]`. The two header
//! lines are pinned; when the total exceeds `max_lines` the oldest body lines
//! are dropped.

use crate::process::ProcessExitError;

pub const DEFAULT_MAX_LINES: usize = 1000;
pub const SUCCESS_STATUS: &str = "✓ Command completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Command,
    Output,
    Blank,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub kind: LineKind,
    pub text: String,
}

impl DisplayLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    fn blank() -> Self {
        Self::new(LineKind::Blank, "")
    }
}

#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    lines: Vec<DisplayLine>,
    header_len: usize,
    max_lines: usize,
    finished: bool,
}

impl DisplayBuffer {
    pub fn new(command_line: &str, max_lines: usize) -> Self {
        // Multi-line scripts are shown on the single header row.
        let command_line = if command_line.contains('\n') {
            command_line.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            command_line.to_string()
        };
        let lines = vec![
            DisplayLine::new(LineKind::Command, format!("$ {command_line}")),
            DisplayLine::blank(),
        ];
        let header_len = lines.len();
        Self {
            lines,
            header_len,
            max_lines: max_lines.max(header_len + 1),
            finished: false,
        }
    }

    /// Replace the body with the tail of `output` that fits. Ignored once finished.
    pub fn rebuild(&mut self, output: &[String]) {
        if self.finished {
            return;
        }
        let room = self.body_capacity();
        let start = output.len().saturating_sub(room);
        self.lines.truncate(self.header_len);
        self.lines.extend(
            output[start..]
                .iter()
                .map(|line| DisplayLine::new(LineKind::Output, strip_ansi(line))),
        );
    }

    /// Append the blank separator and status line. Only the first call has an effect.
    pub fn finish(&mut self, error: Option<&ProcessExitError>) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;
        self.lines.push(DisplayLine::blank());
        self.lines.push(match error {
            None => DisplayLine::new(LineKind::Success, SUCCESS_STATUS),
            Some(err) => DisplayLine::new(LineKind::Failure, format!("Error: {err}")),
        });
        self.enforce_limit();
        true
    }

    pub fn lines(&self) -> &[DisplayLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in `[offset, offset + height)`, clipped to the buffer.
    pub fn window(&self, offset: usize, height: usize) -> &[DisplayLine] {
        let start = offset.min(self.lines.len());
        let end = start.saturating_add(height).min(self.lines.len());
        &self.lines[start..end]
    }

    fn body_capacity(&self) -> usize {
        self.max_lines - self.header_len
    }

    fn enforce_limit(&mut self) {
        let body = self.lines.len() - self.header_len;
        let excess = body.saturating_sub(self.body_capacity());
        if excess > 0 {
            self.lines.drain(self.header_len..self.header_len + excess);
        }
    }
}

fn strip_ansi(line: &str) -> String {
    if line.contains('\u{1b}') {
        String::from_utf8_lossy(&strip_ansi_escapes::strip(line)).into_owned()
    } else {
        line.to_string()
    }
}
