// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Child process execution with timeouts and cancellation.
//!
//! Every command runs through `ProcessRunner`. The system implementation
//! isolates platform differences: on unix each child leads its own process
//! group, so a timeout or interrupt terminates the tool and anything it
//! spawned.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::tool::{EXIT_GENERIC_FAILURE, EXIT_TERMINATED};

/// Interval between exit checks while a child runs.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Time a terminated process group gets before SIGKILL.
const TERM_GRACE: Duration = Duration::from_millis(500);

/// How long pipe readers may keep going after the child exits.
const PIPE_GRACE: Duration = Duration::from_secs(2);

const READ_CHUNK: usize = 8 * 1024;

/// Set by the SIGINT/SIGTERM handler.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Cooperative cancellation flag shared by every execution in a run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    signals: bool,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also trips when the process receives SIGINT or SIGTERM.
    ///
    /// Requires `install_interrupt_handler` to have been called.
    pub fn with_signals() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            signals: true,
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || (self.signals && INTERRUPTED.load(Ordering::SeqCst))
    }
}

/// Route SIGINT and SIGTERM to signal-aware cancel tokens.
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn install_interrupt_handler() {
    extern "C" fn on_signal(_signal: libc::c_int) {
        INTERRUPTED.store(true, Ordering::SeqCst);
    }

    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: the handler only performs an atomic store, which is async-signal-safe.
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
    }
}

#[cfg(not(unix))]
pub fn install_interrupt_handler() {}

/// A fully resolved command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub cwd: PathBuf,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: cwd.into(),
            timeout,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Captured result of a finished (or terminated) process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// Runs commands to completion, enforcing each command's timeout.
pub trait ProcessRunner: Send + Sync {
    /// Spawn errors are returned as `Err`; everything after spawn is
    /// reported in the output.
    fn run(&self, spec: &CommandSpec, cancel: &CancelToken) -> io::Result<ProcessOutput>;
}

/// `std::process` backed runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, spec: &CommandSpec, cancel: &CancelToken) -> io::Result<ProcessOutput> {
        let start = Instant::now();

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .envs(&spec.env)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        isolate(&mut command);

        let mut child = command.spawn()?;
        let mut stdout = PipeCollector::spawn(child.stdout.take());
        let mut stderr = PipeCollector::spawn(child.stderr.take());

        let mut timed_out = false;
        let mut cancelled = false;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if cancel.is_cancelled() {
                cancelled = true;
                break terminate(&mut child)?;
            }
            let elapsed = start.elapsed();
            if elapsed >= spec.timeout {
                timed_out = true;
                break terminate(&mut child)?;
            }
            thread::sleep(POLL_INTERVAL.min(spec.timeout - elapsed));
        };

        // Leftover group members (background jobs) can hold the pipes open
        // past the leader's exit. Keep what they wrote, then stop them.
        let deadline = Instant::now() + PIPE_GRACE;
        stdout.drain_until(deadline);
        stderr.drain_until(deadline);
        if !(stdout.done && stderr.done) {
            tracing::debug!(
                "{} exited with its output pipes still open, stopping its process group",
                spec.program.display()
            );
            stop_group(&child);
            let deadline = Instant::now() + PIPE_GRACE;
            stdout.drain_until(deadline);
            stderr.drain_until(deadline);
        }

        let exit_code = if timed_out || cancelled {
            EXIT_TERMINATED
        } else {
            exit_code_of(status)
        };

        Ok(ProcessOutput {
            exit_code,
            stdout: stdout.into_string(),
            stderr: stderr.into_string(),
            timed_out,
            cancelled,
            elapsed: start.elapsed(),
        })
    }
}

/// Put the child in its own process group.
#[cfg(unix)]
fn isolate(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate(_command: &mut Command) {}

/// Terminate the child's process group and reap it.
#[cfg(unix)]
fn terminate(child: &mut Child) -> io::Result<ExitStatus> {
    signal_group(child, libc::SIGTERM);
    let deadline = Instant::now() + TERM_GRACE;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait()? {
            // Leader is gone; make sure stragglers in the group are too.
            signal_group(child, libc::SIGKILL);
            return Ok(status);
        }
        thread::sleep(POLL_INTERVAL);
    }
    signal_group(child, libc::SIGKILL);
    child.wait()
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> io::Result<ExitStatus> {
    child.kill().ok();
    child.wait()
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn signal_group(child: &Child, signal: libc::c_int) {
    let Ok(pid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: kill(2) has no memory-safety preconditions; a negative pid
    // addresses the process group created by `isolate`.
    unsafe {
        libc::kill(-pid, signal);
    }
}

/// Kill whatever is left in the child's process group.
#[cfg(unix)]
fn stop_group(child: &Child) {
    signal_group(child, libc::SIGKILL);
}

#[cfg(not(unix))]
fn stop_group(_child: &Child) {}

/// Bytes read so far from one pipe. The reader thread forwards each chunk
/// as it arrives, so output survives a reader that never sees EOF.
struct PipeCollector {
    rx: Receiver<Vec<u8>>,
    buf: Vec<u8>,
    done: bool,
}

impl PipeCollector {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        if let Some(mut pipe) = pipe {
            thread::spawn(move || {
                let mut chunk = [0u8; READ_CHUNK];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => {
                            if tx.send(chunk[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(_) => break,
                    }
                }
            });
        }
        Self {
            rx,
            buf: Vec::new(),
            done: false,
        }
    }

    /// Receive chunks until EOF or `deadline`.
    fn drain_until(&mut self, deadline: Instant) {
        while !self.done {
            match self.rx.recv_deadline(deadline) {
                Ok(chunk) => self.buf.extend_from_slice(&chunk),
                Err(RecvTimeoutError::Disconnected) => self.done = true,
                Err(RecvTimeoutError::Timeout) => break,
            }
        }
    }

    fn into_string(self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}

/// Exit code, or 128 + signal for signal deaths.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    EXIT_GENERIC_FAILURE
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
