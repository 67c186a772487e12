//! Smart commit: check for changes, have the assistant draft a message,
//! let the user edit it, then run `git add -A && git commit` in the modal.

use std::{
    path::PathBuf,
    sync::OnceLock,
    thread,
};

use crossbeam_channel::{Receiver, TryRecvError};
use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use regex::Regex;

use super::app::{Runtime, Services, Transition};
use super::text_input::TextBuffer;
use super::theme;
use crate::config::{matches, matches_any, Keybindings};
use crate::git::{Git, GitError};
use crate::modal::{render::draw_modal, ModalRequest, TerminalModal, TickOutcome, Tick};
use crate::process::CommandInvocation;
use crate::logging::CONTENT_TARGET;

pub const SUBJECT_LIMIT: usize = 72;
const SUBJECT_WARN: usize = 50;
const BODY_ROWS: usize = 8;
const BOX_WIDTH: u16 = 74;
const HEREDOC_DELIMITER: &str = "COMMITMSG";

/// Locate a running ssh-agent (or start one) so signed commits work from a
/// session that did not inherit `SSH_AUTH_SOCK`.
const SSH_AGENT_PREAMBLE: &str = r#"
if [ -z "$SSH_AUTH_SOCK" ]; then
    for sock in \
        "$XDG_RUNTIME_DIR/ssh-agent.socket" \
        "$XDG_RUNTIME_DIR/keyring/ssh" \
        "$XDG_RUNTIME_DIR/gcr/ssh" \
        /tmp/ssh-*/agent.*; do
        if [ -S "$sock" ]; then
            export SSH_AUTH_SOCK="$sock"
            break
        fi
    done
fi
if [ -z "$SSH_AUTH_SOCK" ]; then
    eval $(ssh-agent -s) > /dev/null
    ssh-add 2>/dev/null
fi
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChangeCheck {
    has_changes: bool,
    diff_lines: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommitField {
    Subject,
    Body,
}

#[derive(Debug)]
struct CommitEditor {
    subject: TextBuffer,
    body: TextBuffer,
    field: CommitField,
    error: Option<String>,
    diff_lines: usize,
}

impl CommitEditor {
    fn new(subject: &str, body: &str, diff_lines: usize) -> Self {
        Self {
            subject: TextBuffer::single_line(subject).with_limit(SUBJECT_LIMIT),
            body: TextBuffer::multiline(body),
            field: CommitField::Subject,
            error: None,
            diff_lines,
        }
    }

    fn focused(&mut self) -> &mut TextBuffer {
        match self.field {
            CommitField::Subject => &mut self.subject,
            CommitField::Body => &mut self.body,
        }
    }

    fn message(&self) -> String {
        let subject = self.subject.text().trim();
        let body = self.body.text().trim();
        if body.is_empty() {
            subject.to_string()
        } else {
            format!("{subject}\n\n{body}")
        }
    }

    fn handle_key(&mut self, key: &str, keys: &Keybindings) {
        self.error = None;
        if matches_any(key, &[keys.form.next_field.as_str(), "down"]) {
            self.field = CommitField::Body;
        } else if matches_any(key, &[keys.form.prev_field.as_str(), "up"]) {
            self.field = CommitField::Subject;
        } else if matches_any(key, &[keys.editor.line_start.as_str(), "home"]) {
            self.focused().line_start();
        } else if matches_any(key, &[keys.editor.line_end.as_str(), "end"]) {
            self.focused().line_end();
        } else if key == "enter" {
            match self.field {
                CommitField::Subject => self.field = CommitField::Body,
                CommitField::Body => {
                    self.body.newline();
                }
            }
        } else {
            self.focused().apply_key(key);
        }
    }
}

enum CommitState {
    Checking(Receiver<Result<ChangeCheck, GitError>>),
    NoChanges,
    Generating {
        modal: TerminalModal<()>,
        diff_lines: usize,
    },
    Editing(CommitEditor),
    Committing(TerminalModal<()>),
    Done,
    Error(String),
}

pub struct CommitFlow {
    repo_root: PathBuf,
    state: CommitState,
}

impl CommitFlow {
    /// Begin by checking the working tree on a background thread.
    pub fn start(repo_root: PathBuf, git: Git) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let root = repo_root.clone();
        let spawned = thread::Builder::new()
            .name("commit-check".into())
            .spawn(move || {
                let result = check_for_changes(&git, &root);
                let _ = tx.send(result);
            });
        let state = match spawned {
            Ok(_) => CommitState::Checking(rx),
            Err(err) => CommitState::Error(format!("Failed to check for changes: {err}")),
        };
        Self { repo_root, state }
    }

    pub fn is_checking(&self) -> bool {
        matches!(self.state, CommitState::Checking(_))
    }

    pub fn state_name(&self) -> &'static str {
        match self.state {
            CommitState::Checking(_) => "checking",
            CommitState::NoChanges => "no_changes",
            CommitState::Generating { .. } => "generating",
            CommitState::Editing(_) => "editing",
            CommitState::Committing(_) => "committing",
            CommitState::Done => "done",
            CommitState::Error(_) => "error",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            CommitState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Pick up the background change check. Returns whether state changed.
    pub fn poll_background(&mut self, services: &Services, runtime: &mut Runtime) -> bool {
        let CommitState::Checking(rx) = &self.state else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.state = CommitState::Error("Change check stopped unexpectedly".into());
                return true;
            }
        };
        self.state = match result {
            Err(err) => CommitState::Error(err.to_string()),
            Ok(check) if !check.has_changes => CommitState::NoChanges,
            Ok(check) => self.generate(check.diff_lines, services, runtime),
        };
        true
    }

    fn generate(&self, diff_lines: usize, services: &Services, runtime: &mut Runtime) -> CommitState {
        let invocation =
            CommandInvocation::new(services.claude_cmd.as_str(), ["-p", "/generate-commit-msg"])
                .in_dir(&self.repo_root);
        let request = ModalRequest::new("Generating commit message...", invocation);
        match runtime.open_modal(services, request) {
            Ok(modal) => CommitState::Generating { modal, diff_lines },
            Err(err) => CommitState::Error(format!("Failed to generate commit message: {err}")),
        }
    }

    fn commit(&self, message: &str, services: &Services, runtime: &mut Runtime) -> CommitState {
        let script = commit_script(message, needs_agent_preamble());
        tracing::debug!(target: CONTENT_TARGET, script = %script, "commit script");
        let invocation = CommandInvocation::new(services.shell_cmd.as_str(), ["-c", script.as_str()])
            .in_dir(&self.repo_root);
        let request = ModalRequest::new("Committing changes...", invocation);
        match runtime.open_modal(services, request) {
            Ok(modal) => CommitState::Committing(modal),
            Err(err) => CommitState::Error(format!("Commit failed: {err}")),
        }
    }

    pub fn handle_tick(&mut self, tick: Tick, runtime: &mut Runtime) -> bool {
        let outcome = match &mut self.state {
            CommitState::Generating { modal, .. } | CommitState::Committing(modal) => {
                modal.handle_tick(tick)
            }
            _ => return false,
        };
        let changed = runtime.follow(outcome);
        if outcome == TickOutcome::Finished {
            self.finish_modal();
        }
        changed
    }

    /// Move past a finished generate or commit step.
    fn finish_modal(&mut self) {
        let state = std::mem::replace(&mut self.state, CommitState::Done);
        self.state = match state {
            CommitState::Generating { modal, diff_lines } => {
                let closed = modal.close();
                match closed.exit_error {
                    Some(err) => {
                        CommitState::Error(format!("Failed to generate commit message: {err}"))
                    }
                    None => {
                        let (subject, body) = parse_commit_message(&closed.raw_output);
                        CommitState::Editing(CommitEditor::new(&subject, &body, diff_lines))
                    }
                }
            }
            CommitState::Committing(modal) => {
                let closed = modal.close();
                match closed.exit_error {
                    Some(err) => CommitState::Error(format!("Commit failed: {err}")),
                    None => {
                        tracing::info!(repo = %self.repo_root.display(), "commit completed");
                        CommitState::Done
                    }
                }
            }
            other => other,
        };
    }

    pub fn handle_key(&mut self, key: &str, services: &Services, runtime: &mut Runtime) -> Transition {
        let keys = &services.keys;
        match &mut self.state {
            CommitState::Editing(editor) => {
                if matches(key, &keys.form.cancel) {
                    return Transition::ToMenu;
                }
                if matches(key, &keys.form.submit) {
                    if editor.subject.text().trim().is_empty() {
                        editor.error = Some("Subject is required".into());
                        return Transition::Stay;
                    }
                    let message = editor.message();
                    self.state = self.commit(&message, services, runtime);
                    return Transition::Stay;
                }
                editor.handle_key(key, keys);
                Transition::Stay
            }
            CommitState::Generating { modal, .. } | CommitState::Committing(modal) => {
                if keys.is_quit(key) {
                    return Transition::ToMenu;
                }
                modal.handle_key(key, keys);
                Transition::Stay
            }
            CommitState::Checking(_) => {
                if keys.is_quit(key) {
                    Transition::ToMenu
                } else {
                    Transition::Stay
                }
            }
            CommitState::NoChanges | CommitState::Done | CommitState::Error(_) => {
                if keys.is_quit(key) || matches_any(key, &["enter", "space"]) {
                    Transition::ToMenu
                } else {
                    Transition::Stay
                }
            }
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if let CommitState::Generating { modal, .. } | CommitState::Committing(modal) = &mut self.state {
            modal.resize(width, height);
        }
    }

    /// Leave the flow, closing a modal that is still open.
    pub fn dispose(self) {
        match self.state {
            CommitState::Generating { modal, .. } | CommitState::Committing(modal) => {
                modal.close();
            }
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame<'_>, area: Rect, keys: &Keybindings) {
        let lines = match &self.state {
            CommitState::Generating { modal, .. } | CommitState::Committing(modal) => {
                draw_modal(frame, modal, &keys.modal_hint());
                return;
            }
            CommitState::Editing(editor) => {
                draw_editor(frame, area, editor, keys);
                return;
            }
            CommitState::Checking(_) => vec![Line::styled("Checking for changes...", theme::title())],
            CommitState::NoChanges => vec![
                Line::styled("No Changes", theme::title()),
                Line::from(""),
                Line::styled(
                    "There are no uncommitted changes in this repository.",
                    theme::help(),
                ),
                Line::from(""),
                Line::styled("Press Enter to go back", theme::help()),
            ],
            CommitState::Done => vec![
                Line::styled("✓ Committed", theme::selected()),
                Line::from(""),
                Line::styled("Changes committed successfully.", theme::help()),
                Line::from(""),
                Line::styled("Press Enter to go back", theme::help()),
            ],
            CommitState::Error(message) => vec![
                Line::styled("Error", theme::error()),
                Line::from(""),
                Line::styled(message.clone(), theme::error()),
                Line::from(""),
                Line::styled("Press Enter to go back", theme::help()),
            ],
        };
        draw_centered_lines(frame, area, lines);
    }
}

fn draw_centered_lines(frame: &mut Frame<'_>, area: Rect, lines: Vec<Line<'static>>) {
    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
    let target = crate::modal::render::centered(area, width.max(1), lines.len() as u16);
    frame.render_widget(Paragraph::new(lines), target);
}

fn field_label(text: &str, focused: bool) -> Line<'static> {
    if focused {
        Line::styled(format!("▸ {text}"), theme::selected())
    } else {
        Line::styled(format!("  {text}"), theme::label())
    }
}

fn input_box(focused: bool) -> Block<'static> {
    let color = if focused { theme::PURPLE } else { theme::SUBTLE };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_editor(frame: &mut Frame<'_>, area: Rect, editor: &CommitEditor, keys: &Keybindings) {
    let height = 1 + 1 + 1 + 3 + 1 + 1 + 1 + (BODY_ROWS as u16 + 2) + 1 + 1 + 1;
    let outer = crate::modal::render::centered(area, BOX_WIDTH, height);
    let row = |offset: u16, rows: u16| Rect {
        x: outer.x,
        y: outer.y + offset,
        width: outer.width,
        height: rows.min(outer.height.saturating_sub(offset)),
    };
    let subject_focused = editor.field == CommitField::Subject;
    let body_focused = editor.field == CommitField::Body;

    let title = Line::styled(
        format!("Smart Commit  ({} diff lines)", editor.diff_lines),
        theme::title(),
    );
    frame.render_widget(Paragraph::new(title), row(0, 1));
    frame.render_widget(Paragraph::new(field_label("Subject:", subject_focused)), row(2, 1));
    frame.render_widget(
        Paragraph::new(editor.subject.styled_lines(theme::input(), theme::cursor(), subject_focused))
            .block(input_box(subject_focused)),
        row(3, 3),
    );
    let count = editor.subject.len();
    let count_style = if count > SUBJECT_WARN {
        theme::confirm()
    } else {
        theme::help()
    };
    frame.render_widget(
        Paragraph::new(Line::styled(
            format!("  {count}/{SUBJECT_LIMIT} characters"),
            count_style,
        )),
        row(6, 1),
    );
    frame.render_widget(Paragraph::new(field_label("Body (optional):", body_focused)), row(8, 1));

    let body_lines = editor
        .body
        .styled_lines(theme::input(), theme::cursor(), body_focused);
    let (cursor_row, _) = editor.body.cursor_position();
    let scroll = cursor_row.saturating_sub(BODY_ROWS - 1) as u16;
    frame.render_widget(
        Paragraph::new(body_lines)
            .scroll((scroll, 0))
            .block(input_box(body_focused)),
        row(9, BODY_ROWS as u16 + 2),
    );

    let help = format!(
        "{} commit • {}/{} switch field • {} cancel",
        keys.form.submit, keys.form.next_field, keys.form.prev_field, keys.form.cancel
    );
    frame.render_widget(Paragraph::new(Line::styled(help, theme::help())), row(20, 1));
    if let Some(error) = &editor.error {
        frame.render_widget(
            Paragraph::new(Line::styled(format!("Error: {error}"), theme::error())),
            row(21, 1),
        );
    }
}

fn check_for_changes(git: &Git, root: &std::path::Path) -> Result<ChangeCheck, GitError> {
    if !git.has_local_changes(root)? {
        return Ok(ChangeCheck {
            has_changes: false,
            diff_lines: 0,
        });
    }
    // Untracked-only trees and fresh repositories have no diff against HEAD.
    let diff = git.diff_head(root).unwrap_or_default();
    Ok(ChangeCheck {
        has_changes: true,
        diff_lines: diff.lines().count(),
    })
}

fn needs_agent_preamble() -> bool {
    cfg!(target_os = "linux") && std::env::var_os("SSH_AUTH_SOCK").is_none()
}

/// Shell script that stages everything and commits `message`, passed through
/// a quoted heredoc so no part of it is expanded by the shell.
pub fn commit_script(message: &str, ssh_agent_preamble: bool) -> String {
    let mut delimiter = HEREDOC_DELIMITER.to_string();
    while message.lines().any(|line| line == delimiter) {
        delimiter.push('_');
    }
    let commit = format!(
        "git add -A && git commit -m \"$(cat <<'{delimiter}'\n{message}\n{delimiter}\n)\""
    );
    if ssh_agent_preamble {
        format!("{SSH_AGENT_PREAMBLE}\n{commit}")
    } else {
        commit
    }
}

/// Extract `(subject, body)` from assistant output that may wrap the message
/// in a markdown fence or precede it with chatter.
pub fn parse_commit_message(output: &str) -> (String, String) {
    static PREFIX_RE: OnceLock<Regex> = OnceLock::new();
    let prefix = PREFIX_RE.get_or_init(|| {
        Regex::new(r"(?i)^(feat|fix|refactor|docs|style|test|chore)(\([^)]*\))?!?:")
            .expect("commit prefix regex should compile")
    });

    let lines: Vec<&str> = output.lines().collect();
    let start = lines
        .iter()
        .position(|line| !is_fence(line) && prefix.is_match(line.trim()))
        .unwrap_or(0);
    let kept: Vec<&str> = lines[start.min(lines.len())..]
        .iter()
        .copied()
        .filter(|line| !is_fence(line))
        .collect();
    let joined = kept.join("\n");
    let message = joined.trim();
    match message.split_once('\n') {
        Some((subject, body)) => (subject.trim().to_string(), body.trim().to_string()),
        None => (message.to_string(), String::new()),
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ProcessExitError, StreamKind};
    use crate::ui::test_support::Fixture;
    use std::time::{Duration, Instant};

    #[test]
    fn parses_plain_message() {
        let (subject, body) = parse_commit_message("feat: add thing\n\nLonger body\nline two\n");
        assert_eq!(subject, "feat: add thing");
        assert_eq!(body, "Longer body\nline two");
    }

    #[test]
    fn skips_preamble_and_fences() {
        let output = "Here is your commit message:\n\n```\nfix(parser): handle empty input\n\nDetails here.\n```\n";
        let (subject, body) = parse_commit_message(output);
        assert_eq!(subject, "fix(parser): handle empty input");
        assert_eq!(body, "Details here.");
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        let (subject, body) = parse_commit_message("Sure!\nChore: bump deps");
        assert_eq!(subject, "Chore: bump deps");
        assert!(body.is_empty());
    }

    #[test]
    fn falls_back_to_first_line_without_fences() {
        let (subject, body) = parse_commit_message("```text\nUpdate README\n\nMore words\n```");
        assert_eq!(subject, "Update README");
        assert_eq!(body, "More words");
    }

    #[test]
    fn empty_output_gives_empty_message() {
        assert_eq!(parse_commit_message(""), (String::new(), String::new()));
        assert_eq!(parse_commit_message("```\n```"), (String::new(), String::new()));
    }

    #[test]
    fn commit_script_uses_quoted_heredoc() {
        let script = commit_script("feat: x\n\nbody with $HOME and `ticks`", false);
        assert!(script.starts_with("git add -A && git commit -m \"$(cat <<'COMMITMSG'\n"));
        assert!(script.contains("\nbody with $HOME and `ticks`\nCOMMITMSG\n)\""));
    }

    #[test]
    fn commit_script_avoids_delimiter_collision() {
        let script = commit_script("feat: x\nCOMMITMSG\nmore", false);
        assert!(script.contains("<<'COMMITMSG_'"));
        assert!(script.ends_with("\nCOMMITMSG_\n)\""));
    }

    #[test]
    fn commit_script_prepends_agent_lookup() {
        let script = commit_script("fix: y", true);
        assert!(script.contains("ssh-agent -s"));
        assert!(script.trim_end().ends_with(")\""));
        assert!(script.find("SSH_AUTH_SOCK") < script.find("git add -A"));
    }

    #[test]
    fn editor_switches_fields_and_limits_subject() {
        let keys = Keybindings::default();
        let long = "x".repeat(100);
        let mut editor = CommitEditor::new(&long, "", 3);
        assert_eq!(editor.subject.len(), SUBJECT_LIMIT);
        editor.handle_key("tab", &keys);
        assert_eq!(editor.field, CommitField::Body);
        editor.handle_key("a", &keys);
        editor.handle_key("enter", &keys);
        editor.handle_key("b", &keys);
        assert_eq!(editor.body.text(), "a\nb");
        editor.handle_key("shift+tab", &keys);
        assert_eq!(editor.field, CommitField::Subject);
        editor.handle_key("backspace", &keys);
        assert_eq!(editor.subject.len(), SUBJECT_LIMIT - 1);
        assert_eq!(editor.message(), format!("{}\n\na\nb", "x".repeat(71)));
    }

    #[test]
    fn editor_message_omits_empty_body() {
        let editor = CommitEditor::new("  docs: readme  ", "   ", 0);
        assert_eq!(editor.message(), "docs: readme");
    }

    fn checking(result: Result<ChangeCheck, GitError>) -> CommitFlow {
        let (tx, rx) = crossbeam_channel::bounded(1);
        tx.send(result).unwrap();
        CommitFlow {
            repo_root: PathBuf::from("/work/repo"),
            state: CommitState::Checking(rx),
        }
    }

    fn run_ticks(flow: &mut CommitFlow, fixture: &mut Fixture) {
        let later = Instant::now() + Duration::from_secs(1);
        for tick in fixture.runtime.take_due(later) {
            flow.handle_tick(tick, &mut fixture.runtime);
        }
    }

    #[test]
    fn clean_tree_reports_no_changes() {
        let mut fixture = Fixture::new();
        let mut flow = checking(Ok(ChangeCheck {
            has_changes: false,
            diff_lines: 0,
        }));
        assert!(flow.poll_background(&fixture.services, &mut fixture.runtime));
        assert_eq!(flow.state_name(), "no_changes");
        assert_eq!(fixture.launcher.count(), 0);
        let transition = flow.handle_key("enter", &fixture.services, &mut fixture.runtime);
        assert_eq!(transition, Transition::ToMenu);
    }

    #[test]
    fn git_failure_becomes_error_state() {
        let mut fixture = Fixture::new();
        let mut flow = checking(Err(GitError::NotRepo));
        flow.poll_background(&fixture.services, &mut fixture.runtime);
        assert_eq!(flow.error(), Some("not a git repository"));
    }

    #[test]
    fn generate_edit_and_commit() {
        let mut fixture = Fixture::new();
        let mut flow = checking(Ok(ChangeCheck {
            has_changes: true,
            diff_lines: 12,
        }));
        flow.poll_background(&fixture.services, &mut fixture.runtime);
        assert_eq!(flow.state_name(), "generating");
        let generate = fixture.launcher.invocation(0);
        assert_eq!(generate.program(), "claude");
        assert_eq!(generate.args(), ["-p", "/generate-commit-msg"]);
        assert_eq!(generate.dir(), Some(std::path::Path::new("/work/repo")));

        let writer = fixture.launcher.writer(0);
        for line in ["Here you go:", "```", "feat: add login", "", "Adds the form.", "```"] {
            writer.append(StreamKind::Stdout, line);
        }
        writer.mark_done(None);
        run_ticks(&mut flow, &mut fixture);
        assert_eq!(flow.state_name(), "editing");
        let CommitState::Editing(editor) = &flow.state else {
            panic!("expected editor");
        };
        assert_eq!(editor.subject.text(), "feat: add login");
        assert_eq!(editor.body.text(), "Adds the form.");
        assert_eq!(editor.diff_lines, 12);

        // Plain letters are typed, not treated as navigation.
        flow.handle_key("q", &fixture.services, &mut fixture.runtime);
        assert_eq!(flow.state_name(), "editing");
        flow.handle_key("backspace", &fixture.services, &mut fixture.runtime);

        flow.handle_key("ctrl+s", &fixture.services, &mut fixture.runtime);
        assert_eq!(flow.state_name(), "committing");
        let commit = fixture.launcher.invocation(1);
        assert_eq!(commit.program(), "bash");
        assert_eq!(commit.args()[0], "-c");
        assert!(commit.args()[1].contains("feat: add login\n\nAdds the form.\nCOMMITMSG"));

        fixture.launcher.writer(1).mark_done(None);
        run_ticks(&mut flow, &mut fixture);
        assert_eq!(flow.state_name(), "done");
    }

    #[test]
    fn empty_subject_is_rejected() {
        let mut fixture = Fixture::new();
        let mut flow = CommitFlow {
            repo_root: PathBuf::from("/work/repo"),
            state: CommitState::Editing(CommitEditor::new("", "", 0)),
        };
        flow.handle_key("ctrl+s", &fixture.services, &mut fixture.runtime);
        assert_eq!(flow.state_name(), "editing");
        assert_eq!(fixture.launcher.count(), 0);
        let CommitState::Editing(editor) = &flow.state else {
            panic!("expected editor");
        };
        assert_eq!(editor.error.as_deref(), Some("Subject is required"));
    }

    #[test]
    fn failed_commit_shows_error() {
        let mut fixture = Fixture::new();
        let mut flow = CommitFlow {
            repo_root: PathBuf::from("/work/repo"),
            state: CommitState::Editing(CommitEditor::new("fix: y", "", 0)),
        };
        flow.handle_key("ctrl+s", &fixture.services, &mut fixture.runtime);
        fixture
            .launcher
            .writer(0)
            .mark_done(Some(ProcessExitError::Status(1)));
        run_ticks(&mut flow, &mut fixture);
        assert_eq!(flow.error(), Some("Commit failed: exit status 1"));
    }
}

