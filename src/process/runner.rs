use std::{
    io::{self, BufRead, BufReader, Read},
    path::{Path, PathBuf},
    process::{Child, ChildStderr, ChildStdout, Command, Stdio},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use super::{
    error::{ProcessExitError, SpawnError, StreamReadError},
    sink::{output_channel, OutputSink, SinkStatus, SinkWriter, StreamKind},
};

/// Grace period between SIGTERM and SIGKILL when a cancel is requested.
const KILL_GRACE: Duration = Duration::from_millis(500);

/// What to run: program, arguments, optional working directory and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    program: String,
    args: Vec<String>,
    dir: Option<PathBuf>,
    env: Option<Vec<(String, String)>>,
}

impl CommandInvocation {
    pub fn new<I, A>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            dir: None,
            env: None,
        }
    }

    /// Run in `dir` instead of the current directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Replace the child environment. An empty list inherits the parent's.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn env(&self) -> Option<&[(String, String)]> {
        self.env.as_deref()
    }

    /// Shell-quoted rendering used for the modal header.
    pub fn display_line(&self) -> String {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }
        if let Some(vars) = self.env.as_ref().filter(|vars| !vars.is_empty()) {
            command.env_clear();
            command.envs(vars.iter().map(|(key, value)| (key.as_str(), value.as_str())));
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        command
    }
}

/// Starts subprocesses for the modal. The UI holds one behind an `Arc`.
pub trait ProcessLauncher: Send + Sync {
    fn start(&self, invocation: CommandInvocation) -> Result<RunningProcess, SpawnError>;
}

/// Launcher backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn start(&self, invocation: CommandInvocation) -> Result<RunningProcess, SpawnError> {
        start(invocation)
    }
}

/// Spawn the invocation with piped stdout/stderr and begin streaming its lines.
///
/// Two reader loops (one per stream) feed the returned process's sink; a
/// supervisor waits for both to reach end of stream, reaps the child and
/// records the exit status. Returns once the child is running.
pub fn start(invocation: CommandInvocation) -> Result<RunningProcess, SpawnError> {
    if invocation.program.trim().is_empty() {
        return Err(SpawnError::EmptyProgram);
    }
    if let Some(dir) = invocation.dir() {
        if !dir.is_dir() {
            return Err(SpawnError::WorkingDir {
                dir: dir.to_path_buf(),
            });
        }
    }

    let mut child = invocation
        .command()
        .spawn()
        .map_err(|err| SpawnError::from_io(&invocation.program, err))?;
    let pid = child.id();
    let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
        (Some(stdout), Some(stderr)) => (stdout, stderr),
        _ => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SpawnError::Launch {
                program: invocation.program.clone(),
                source: io::Error::new(io::ErrorKind::BrokenPipe, "output pipes unavailable"),
            });
        }
    };

    tracing::info!(
        program = %invocation.program,
        pid,
        args = invocation.args.len(),
        "spawned"
    );

    let (writer, sink) = output_channel();
    let exited = Arc::new(AtomicBool::new(false));
    let supervisor_exited = Arc::clone(&exited);
    let program = invocation.program.clone();
    let supervisor = thread::Builder::new()
        .name(format!("devdeck-proc-{pid}"))
        .spawn(move || supervise(child, stdout, stderr, writer, supervisor_exited, program));

    let supervisor = match supervisor {
        Ok(handle) => handle,
        Err(err) => {
            terminate_group(pid, libc_signal(Signal::Kill));
            return Err(SpawnError::Launch {
                program: invocation.program.clone(),
                source: err,
            });
        }
    };

    Ok(RunningProcess {
        invocation,
        pid,
        sink,
        cancel: CancelHandle {
            pid,
            exited,
            requested: Arc::new(AtomicBool::new(false)),
        },
        supervisor: Some(supervisor),
    })
}

fn supervise(
    mut child: Child,
    stdout: ChildStdout,
    stderr: ChildStderr,
    writer: SinkWriter,
    exited: Arc<AtomicBool>,
    program: String,
) {
    let pid = child.id();
    let stderr_writer = writer.clone();
    let stderr_reader = thread::Builder::new()
        .name(format!("devdeck-stderr-{pid}"))
        .spawn(move || read_lines(stderr, StreamKind::Stderr, &stderr_writer));

    read_lines(stdout, StreamKind::Stdout, &writer);
    tracing::debug!(pid, stream = "stdout", "stream closed");

    match stderr_reader {
        Ok(handle) => {
            if handle.join().is_err() {
                tracing::error!(pid, "stderr reader panicked");
            }
        }
        Err(err) => {
            // The stream was dropped unread.
            tracing::warn!(pid, error = %err, "stderr reader not started");
        }
    }
    tracing::debug!(pid, stream = "stderr", "stream closed");

    let error = match child.wait() {
        Ok(status) => ProcessExitError::from_status(status),
        Err(err) => Some(ProcessExitError::Wait(err.to_string())),
    };
    exited.store(true, Ordering::SeqCst);

    match &error {
        None => tracing::info!(program = %program, pid, "exited"),
        Some(err) => tracing::info!(program = %program, pid, error = %err, "exited"),
    }
    writer.mark_done(error);
}

fn read_lines<R: Read>(source: R, stream: StreamKind, writer: &SinkWriter) {
    let mut reader = BufReader::new(source);
    let mut buf = Vec::with_capacity(256);
    let mut forwarding = true;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if !forwarding {
                    // Keep draining so the child never blocks on a full pipe.
                    continue;
                }
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                forwarding = writer.append(stream, line);
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                let err = StreamReadError { stream, source: err };
                tracing::warn!(stream = stream.label(), error = %err, "stream read failed");
                break;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Term,
    Kill,
}

fn libc_signal(signal: Signal) -> i32 {
    #[cfg(unix)]
    {
        match signal {
            Signal::Term => libc::SIGTERM,
            Signal::Kill => libc::SIGKILL,
        }
    }
    #[cfg(not(unix))]
    {
        let _ = signal;
        0
    }
}

/// Signal the child's whole process group so shell pipelines stop too.
fn terminate_group(pid: u32, signo: i32) -> bool {
    #[cfg(unix)]
    {
        let pgid = match i32::try_from(pid) {
            Ok(pgid) if pgid > 0 => pgid,
            _ => return false,
        };
        // SAFETY: kill(2) has no memory-safety preconditions; a negative pid
        // addresses the process group created by `process_group(0)`.
        let rc = unsafe { libc::kill(-pgid, signo) };
        if rc != 0 {
            tracing::warn!(
                pid,
                signo,
                error = %io::Error::last_os_error(),
                "signal to process group failed"
            );
            return false;
        }
        true
    }
    #[cfg(not(unix))]
    {
        let _ = (pid, signo);
        tracing::warn!(pid, "cancellation unsupported on this platform");
        false
    }
}

/// Explicit cancellation hook for a running process.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    pid: u32,
    exited: Arc<AtomicBool>,
    requested: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Send SIGTERM to the process group, escalating to SIGKILL if it is still
    /// alive after a short grace period. Returns `false` when the process has
    /// already exited or a cancel was already requested.
    pub fn cancel(&self) -> bool {
        if self.exited.load(Ordering::SeqCst) || self.requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        tracing::info!(pid = self.pid, "cancel requested");
        if !terminate_group(self.pid, libc_signal(Signal::Term)) {
            return false;
        }

        let pid = self.pid;
        let exited = Arc::clone(&self.exited);
        let escalation = thread::Builder::new()
            .name(format!("devdeck-kill-{pid}"))
            .spawn(move || {
                thread::sleep(KILL_GRACE);
                if !exited.load(Ordering::SeqCst) {
                    terminate_group(pid, libc_signal(Signal::Kill));
                }
            });
        if let Err(err) = escalation {
            tracing::warn!(pid, error = %err, "kill escalation not started");
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn has_exited(&self) -> bool {
        self.exited.load(Ordering::SeqCst)
    }
}

/// A started subprocess together with the UI side of its output sink.
///
/// Dropping it detaches: the reader threads keep draining the pipes and
/// discard what they read until the child exits.
pub struct RunningProcess {
    invocation: CommandInvocation,
    pid: u32,
    sink: OutputSink,
    cancel: CancelHandle,
    supervisor: Option<JoinHandle<()>>,
}

impl RunningProcess {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn invocation(&self) -> &CommandInvocation {
        &self.invocation
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Fold pending output into the sink. Joins the supervisor once done.
    pub fn poll(&mut self) -> usize {
        let added = self.sink.poll();
        if self.sink.is_done() {
            if let Some(handle) = self.supervisor.take() {
                if handle.join().is_err() {
                    tracing::error!(pid = self.pid, "supervisor panicked");
                }
                tracing::debug!(
                    pid = self.pid,
                    lines = self.sink.lines().len(),
                    stderr_lines = self.sink.stderr_line_count(),
                    "output drained"
                );
            }
        }
        added
    }

    pub fn status(&self) -> SinkStatus {
        self.sink.status()
    }

    pub fn snapshot(&mut self) -> Vec<String> {
        self.poll();
        self.sink.lines().to_vec()
    }

    pub fn raw_output(&mut self) -> String {
        self.poll();
        self.sink.lines().join("\n")
    }
}

#[cfg(test)]
pub(crate) fn build_test_process(invocation: CommandInvocation) -> (RunningProcess, SinkWriter) {
    let (writer, sink) = output_channel();
    let process = RunningProcess {
        invocation,
        pid: 0,
        sink,
        cancel: CancelHandle {
            pid: 0,
            exited: Arc::new(AtomicBool::new(true)),
            requested: Arc::new(AtomicBool::new(false)),
        },
        supervisor: None,
    };
    (process, writer)
}
