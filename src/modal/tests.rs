use super::*;
use crate::process::{build_test_process, SinkWriter, StreamKind, SystemLauncher};
use std::{
    cell::Cell,
    rc::Rc,
    sync::Mutex,
    thread,
    time::{Duration, Instant},
};

const SCREEN: (u16, u16) = (100, 40);

/// Hands out pre-built processes whose output the test writes directly.
struct ScriptedLauncher {
    writers: Mutex<Vec<SinkWriter>>,
}

impl ScriptedLauncher {
    fn new() -> Self {
        Self {
            writers: Mutex::new(Vec::new()),
        }
    }

    fn writer(&self, index: usize) -> SinkWriter {
        self.writers.lock().unwrap()[index].clone()
    }
}

impl ProcessLauncher for ScriptedLauncher {
    fn start(&self, invocation: CommandInvocation) -> Result<RunningProcess, SpawnError> {
        let (process, writer) = build_test_process(invocation);
        self.writers.lock().unwrap().push(writer);
        Ok(process)
    }
}

struct FailingLauncher;

impl ProcessLauncher for FailingLauncher {
    fn start(&self, invocation: CommandInvocation) -> Result<RunningProcess, SpawnError> {
        Err(SpawnError::NotFound {
            program: invocation.program().to_string(),
        })
    }
}

fn echo_request<S>() -> ModalRequest<S> {
    ModalRequest::new("Test", CommandInvocation::new("echo", ["hi"]))
}

fn open_scripted<S>(
    launcher: &ScriptedLauncher,
    sessions: &mut SessionFactory,
    request: ModalRequest<S>,
) -> (TerminalModal<S>, Tick) {
    TerminalModal::open(request, sessions, launcher, &ModalSettings::default(), SCREEN)
        .unwrap_or_else(|_| panic!("scripted launcher never fails"))
}

fn texts(buffer: &DisplayBuffer) -> Vec<String> {
    buffer.lines().iter().map(|line| line.text.clone()).collect()
}

#[test]
fn viewport_offset_stays_in_bounds_for_all_sizes() {
    for line_count in 0..30usize {
        for height in 0..12usize {
            let mut viewport = Viewport::new(80, height);
            viewport.set_line_count(line_count);
            let max = line_count.saturating_sub(height);
            assert_eq!(viewport.offset(), max);

            let moves: [fn(&mut Viewport); 6] = [
                Viewport::scroll_up,
                Viewport::page_up,
                Viewport::jump_top,
                Viewport::scroll_down,
                Viewport::page_down,
                Viewport::jump_bottom,
            ];
            for step in 0..40 {
                moves[step % moves.len()](&mut viewport);
                assert!(viewport.offset() <= max, "lines={line_count} height={height}");
                assert_eq!(
                    viewport.auto_scroll(),
                    viewport.offset() == max,
                    "auto-scroll follows bottom for lines={line_count} height={height}"
                );
            }
        }
    }
}

#[test]
fn viewport_zero_height_pages_by_one() {
    let mut viewport = Viewport::new(0, 0);
    viewport.set_line_count(5);
    assert_eq!(viewport.offset(), 5);
    viewport.page_up();
    assert_eq!(viewport.offset(), 4);
    viewport.jump_top();
    viewport.page_down();
    assert_eq!(viewport.offset(), 1);
    assert!(viewport.visible_range().is_empty());
}

#[test]
fn auto_scroll_disengages_and_reengages() {
    let mut viewport = Viewport::new(80, 5);
    viewport.set_line_count(20);
    assert_eq!(viewport.offset(), 15);
    assert!(viewport.auto_scroll());

    viewport.scroll_up();
    assert_eq!(viewport.offset(), 14);
    assert!(!viewport.auto_scroll());

    viewport.set_line_count(30);
    assert_eq!(viewport.offset(), 14, "paused view does not follow new lines");

    viewport.page_down();
    viewport.page_down();
    assert_eq!(viewport.offset(), 24);
    assert!(!viewport.auto_scroll());
    viewport.scroll_down();
    assert_eq!(viewport.offset(), 25);
    assert!(viewport.auto_scroll());

    viewport.set_line_count(40);
    assert_eq!(viewport.offset(), 35);
    assert_eq!(viewport.visible_range(), 35..40);
}

#[test]
fn viewport_resize_clamps_offset() {
    let mut viewport = Viewport::new(80, 5);
    viewport.set_line_count(20);
    viewport.jump_top();
    viewport.scroll_down();
    viewport.scroll_down();
    viewport.resize(80, 19);
    assert_eq!(viewport.offset(), 1);
    viewport.resize(80, 30);
    assert_eq!(viewport.offset(), 0);
    assert_eq!(viewport.visible_range(), 0..20);
}

#[test]
fn display_retention_keeps_header_and_tail() {
    for max_lines in [10usize, 25, 100] {
        for extra in [0usize, 1, 7, 250] {
            let count = max_lines - 2 + extra;
            let output: Vec<String> = (0..count).map(|i| format!("line-{i}")).collect();
            let mut buffer = DisplayBuffer::new("cmd", max_lines);
            buffer.rebuild(&output);

            let lines = texts(&buffer);
            assert_eq!(lines.len(), max_lines, "max={max_lines} extra={extra}");
            assert_eq!(lines[0], "$ cmd");
            assert_eq!(lines[1], "");
            assert_eq!(lines[2], format!("line-{extra}"));
            assert_eq!(lines[max_lines - 1], format!("line-{}", count - 1));
        }
    }
}

#[test]
fn display_under_limit_keeps_everything() {
    let mut buffer = DisplayBuffer::new("cmd", 10);
    buffer.rebuild(&["a".to_string(), "b".to_string()]);
    assert_eq!(texts(&buffer), vec!["$ cmd", "", "a", "b"]);
}

#[test]
fn display_status_appended_once_within_limit() {
    let output: Vec<String> = (0..8).map(|i| format!("l{i}")).collect();
    let mut buffer = DisplayBuffer::new("cmd", 10);
    buffer.rebuild(&output);
    assert!(buffer.finish(None));
    assert!(!buffer.finish(Some(&ProcessExitError::Status(1))));
    buffer.rebuild(&output);

    let lines = texts(&buffer);
    assert_eq!(lines.len(), 10);
    assert_eq!(&lines[..2], ["$ cmd", ""]);
    assert_eq!(lines[2], "l2");
    assert_eq!(lines[8], "");
    assert_eq!(lines[9], SUCCESS_STATUS);
    assert_eq!(buffer.lines()[9].kind, LineKind::Success);
}

#[test]
fn display_failure_status_names_error() {
    let mut buffer = DisplayBuffer::new("false", 50);
    buffer.rebuild(&["boom".to_string()]);
    buffer.finish(Some(&ProcessExitError::Status(1)));
    assert_eq!(
        texts(&buffer),
        vec!["$ false", "", "boom", "", "Error: exit status 1"]
    );
    assert_eq!(buffer.lines()[4].kind, LineKind::Failure);
}

#[test]
fn display_strips_ansi_sequences() {
    let mut buffer = DisplayBuffer::new("ls", 50);
    buffer.rebuild(&["\u{1b}[31mred\u{1b}[0m text".to_string()]);
    assert_eq!(buffer.lines()[2].text, "red text");
}

#[test]
fn display_header_flattens_multiline_scripts() {
    let buffer = DisplayBuffer::new("bash -c 'git add -A\n  git commit'", 50);
    assert_eq!(buffer.lines()[0].text, "$ bash -c 'git add -A git commit'");
}

#[test]
fn display_window_clips_to_buffer() {
    let mut buffer = DisplayBuffer::new("cmd", 50);
    buffer.rebuild(&["a".to_string(), "b".to_string()]);
    assert_eq!(buffer.window(2, 10).len(), 2);
    assert!(buffer.window(10, 10).is_empty());
}

#[test]
fn geometry_follows_screen_percentages() {
    assert_eq!(
        ModalGeometry::for_screen(100, 50),
        ModalGeometry {
            width: 80,
            height: 35
        }
    );
    assert_eq!(
        ModalGeometry::for_screen(300, 100),
        ModalGeometry {
            width: 120,
            height: 40
        }
    );
    let small = ModalGeometry::for_screen(50, 12);
    assert_eq!(small, ModalGeometry { width: 50, height: 10 });
    assert_eq!(small.content_height(), 4);
    assert_eq!(ModalGeometry::for_screen(0, 0).content_height(), 0);
}

#[test]
fn session_ids_increase() {
    let mut sessions = SessionFactory::new();
    let first = sessions.next_id();
    let second = sessions.next_id();
    assert!(second > first);
    assert_ne!(first, second);
}

#[test]
fn scheduler_returns_due_ticks_in_order() {
    let mut sessions = SessionFactory::new();
    let a = sessions.next_id();
    let b = sessions.next_id();
    let now = Instant::now();
    let mut scheduler = TickScheduler::new();
    scheduler.schedule(Tick {
        session: a,
        due: now + Duration::from_millis(30),
    });
    scheduler.schedule(Tick {
        session: b,
        due: now + Duration::from_millis(10),
    });
    scheduler.schedule(Tick {
        session: a,
        due: now + Duration::from_secs(60),
    });

    assert_eq!(
        scheduler.poll_timeout(now, Duration::from_millis(250)),
        Duration::from_millis(10)
    );
    let due = scheduler.take_due(now + Duration::from_millis(40));
    assert_eq!(due.iter().map(|t| t.session).collect::<Vec<_>>(), vec![b, a]);
    assert_eq!(scheduler.len(), 1);
    assert_eq!(
        scheduler.poll_timeout(now, Duration::from_millis(250)),
        Duration::from_millis(250)
    );
}

#[test]
fn running_tick_updates_display_and_reschedules() {
    let launcher = ScriptedLauncher::new();
    let mut sessions = SessionFactory::new();
    let (mut modal, tick) = open_scripted::<()>(&launcher, &mut sessions, echo_request());
    assert_eq!(texts(modal.display()), vec!["$ echo hi", ""]);

    let writer = launcher.writer(0);
    writer.append(StreamKind::Stdout, "hi");
    match modal.handle_tick(tick) {
        TickOutcome::Continue(next) => {
            assert_eq!(next.session, modal.session());
            assert!(next.due >= tick.due);
        }
        other => panic!("expected Continue, got {other:?}"),
    }
    assert!(modal.is_running());
    assert_eq!(texts(modal.display()), vec!["$ echo hi", "", "hi"]);

    writer.mark_done(None);
    assert_eq!(modal.handle_tick(tick), TickOutcome::Finished);
    assert!(!modal.is_running());
    assert_eq!(
        texts(modal.display()),
        vec!["$ echo hi", "", "hi", "", SUCCESS_STATUS]
    );
    assert_eq!(modal.handle_tick(tick), TickOutcome::Finished);
    assert_eq!(modal.display().len(), 5);
}

#[test]
fn stale_tick_leaves_state_untouched() {
    let launcher = ScriptedLauncher::new();
    let mut sessions = SessionFactory::new();
    let (first, old_tick) = open_scripted::<()>(&launcher, &mut sessions, echo_request());
    drop(first.close());

    let (mut second, _) = open_scripted::<()>(&launcher, &mut sessions, echo_request());
    launcher.writer(1).append(StreamKind::Stdout, "fresh");
    launcher.writer(1).mark_done(None);
    let before = texts(second.display());
    let viewport_before = second.viewport().clone();

    assert_eq!(second.handle_tick(old_tick), TickOutcome::Stale);
    assert_eq!(texts(second.display()), before);
    assert_eq!(second.viewport(), &viewport_before);
    assert!(second.is_running());
}

#[test]
fn failed_process_reports_error_status() {
    let launcher = ScriptedLauncher::new();
    let mut sessions = SessionFactory::new();
    let (mut modal, tick) = open_scripted::<()>(&launcher, &mut sessions, echo_request());
    let writer = launcher.writer(0);
    writer.append(StreamKind::Stderr, "boom");
    writer.mark_done(Some(ProcessExitError::Status(1)));

    assert_eq!(modal.handle_tick(tick), TickOutcome::Finished);
    assert_eq!(modal.exit_error(), Some(&ProcessExitError::Status(1)));
    assert_eq!(
        modal.display().lines().last().map(|line| line.text.as_str()),
        Some("Error: exit status 1")
    );
    assert_eq!(modal.raw_output(), "boom");
}

#[test]
fn close_callback_receives_raw_output_once() {
    let launcher = ScriptedLauncher::new();
    let mut sessions = SessionFactory::new();
    let request = echo_request::<Vec<String>>().on_close(|state, output| state.push(output));
    let (mut modal, tick) = open_scripted(&launcher, &mut sessions, request);
    let writer = launcher.writer(0);
    writer.append(StreamKind::Stdout, "\u{1b}[1mline1\u{1b}[0m");
    writer.append(StreamKind::Stdout, "line2");
    writer.mark_done(None);
    modal.handle_tick(tick);

    let closed = modal.close();
    assert!(closed.has_callback());
    assert!(!closed.was_running);
    let mut state = Vec::new();
    assert!(closed.deliver(&mut state));
    assert_eq!(state, vec!["\u{1b}[1mline1\u{1b}[0m\nline2".to_string()]);
}

#[test]
fn close_without_callback_delivers_nothing() {
    let launcher = ScriptedLauncher::new();
    let mut sessions = SessionFactory::new();
    let (modal, _) = open_scripted::<u32>(&launcher, &mut sessions, echo_request());
    let closed = modal.close();
    let mut state = 7;
    assert!(!closed.deliver(&mut state));
    assert_eq!(state, 7);
}

#[test]
fn spawn_failure_drops_callback_uncalled() {
    let called = Rc::new(Cell::new(false));
    let flag = Rc::clone(&called);
    let request = ModalRequest::<()>::new("Missing", CommandInvocation::new("nope", ["x"]))
        .on_close(move |_, _| flag.set(true));
    let mut sessions = SessionFactory::new();
    let result = TerminalModal::open(
        request,
        &mut sessions,
        &FailingLauncher,
        &ModalSettings::default(),
        SCREEN,
    );
    assert!(matches!(result, Err(SpawnError::NotFound { .. })));
    assert!(!called.get());
    assert_eq!(Rc::strong_count(&called), 1);
}

#[test]
fn keys_map_to_viewport_actions() {
    let launcher = ScriptedLauncher::new();
    let mut sessions = SessionFactory::new();
    let (mut modal, tick) = open_scripted::<()>(&launcher, &mut sessions, echo_request());
    let writer = launcher.writer(0);
    for i in 0..100 {
        writer.append(StreamKind::Stdout, format!("{i}"));
    }
    modal.handle_tick(tick);
    let keys = Keybindings::default();
    let bottom = modal.viewport().max_offset();
    assert_eq!(modal.viewport().offset(), bottom);

    assert_eq!(modal.handle_key("k", &keys), KeyOutcome::Handled);
    assert_eq!(modal.viewport().offset(), bottom - 1);
    assert_eq!(modal.handle_key("g", &keys), KeyOutcome::Handled);
    assert_eq!(modal.viewport().offset(), 0);
    assert_eq!(modal.handle_key("pgdown", &keys), KeyOutcome::Handled);
    assert_eq!(modal.viewport().offset(), modal.viewport().height());
    assert_eq!(modal.handle_key("G", &keys), KeyOutcome::Handled);
    assert!(modal.viewport().auto_scroll());
    assert_eq!(modal.handle_key("x", &keys), KeyOutcome::Ignored);
    assert_eq!(modal.handle_key("esc", &keys), KeyOutcome::CloseRequested);
    assert_eq!(modal.handle_key("q", &keys), KeyOutcome::CloseRequested);
}

fn run_until_finished<S>(modal: &mut TerminalModal<S>, first: Tick) {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut tick = first;
    loop {
        let now = Instant::now();
        if tick.due > now {
            thread::sleep(tick.due - now);
        }
        match modal.handle_tick(tick) {
            TickOutcome::Continue(next) => tick = next,
            TickOutcome::Finished => return,
            TickOutcome::Stale => panic!("tick for own session reported stale"),
        }
        assert!(Instant::now() < deadline, "command did not finish");
    }
}

#[test]
fn end_to_end_with_real_process() {
    let mut sessions = SessionFactory::new();
    let request = ModalRequest::<String>::new(
        "Echo",
        CommandInvocation::new("sh", ["-c", "echo line1; echo line2"]),
    )
    .on_close(|state, output| *state = output);
    let (mut modal, tick) = TerminalModal::open(
        request,
        &mut sessions,
        &SystemLauncher,
        &ModalSettings::default(),
        SCREEN,
    )
    .expect("spawn sh");
    run_until_finished(&mut modal, tick);

    assert_eq!(
        texts(modal.display()),
        vec![
            "$ sh -c 'echo line1; echo line2'",
            "",
            "line1",
            "line2",
            "",
            SUCCESS_STATUS
        ]
    );
    let mut state = String::new();
    modal.close().deliver(&mut state);
    assert_eq!(state, "line1\nline2");
}

#[test]
fn real_process_stderr_and_failure_reach_the_modal() {
    let mut sessions = SessionFactory::new();
    let request = ModalRequest::<String>::new(
        "Fail",
        CommandInvocation::new("sh", ["-c", "echo boom 1>&2; exit 1"]),
    )
    .on_close(|state, output| *state = output);
    let (mut modal, tick) = TerminalModal::open(
        request,
        &mut sessions,
        &SystemLauncher,
        &ModalSettings::default(),
        SCREEN,
    )
    .expect("spawn sh");
    run_until_finished(&mut modal, tick);

    assert!(!modal.is_running());
    assert_eq!(modal.exit_error(), Some(&ProcessExitError::Status(1)));
    assert_eq!(
        texts(modal.display()),
        vec![
            "$ sh -c 'echo boom 1>&2; exit 1'",
            "",
            "boom",
            "",
            "Error: exit status 1"
        ]
    );
    assert_eq!(modal.display().lines()[4].kind, LineKind::Failure);
    assert_eq!(modal.raw_output(), "boom");

    let mut state = String::new();
    let closed = modal.close();
    assert_eq!(closed.exit_error, Some(ProcessExitError::Status(1)));
    assert!(closed.deliver(&mut state));
    assert_eq!(state, "boom");
}

#[test]
fn terminate_on_close_fires_cancel_hook() {
    let mut sessions = SessionFactory::new();
    let settings = ModalSettings {
        close_behavior: CloseBehavior::Terminate,
        ..ModalSettings::default()
    };
    let request = ModalRequest::<()>::new("Sleep", CommandInvocation::new("sh", ["-c", "sleep 30"]));
    let (modal, _) = TerminalModal::open(request, &mut sessions, &SystemLauncher, &settings, SCREEN)
        .expect("spawn sh");
    let handle = modal.cancel_handle();
    let closed = modal.close();
    assert!(closed.was_running);
    assert!(handle.is_requested());
}

#[test]
fn detach_on_close_leaves_process_running() {
    let mut sessions = SessionFactory::new();
    let request = ModalRequest::<()>::new("Sleep", CommandInvocation::new("sh", ["-c", "sleep 30"]));
    let (modal, _) = TerminalModal::open(
        request,
        &mut sessions,
        &SystemLauncher,
        &ModalSettings::default(),
        SCREEN,
    )
    .expect("spawn sh");
    let handle = modal.cancel_handle();
    drop(modal.close());
    assert!(!handle.is_requested());
    assert!(!handle.has_exited());
    assert!(handle.cancel());
}
