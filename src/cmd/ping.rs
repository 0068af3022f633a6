use crate::cmd::tee::{Line, Source, Tee};
use crate::error::{PingError, INTERRUPTED_EXIT_CODE, SPAWN_FAILED_EXIT_CODE};
use crate::request::{LogDestination, VerbosityLevel};
use crate::translate::PlatformCommand;

use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, never, select, unbounded, Receiver, Sender};
use tracing::{debug, error, info, warn};

/// How long an interrupted child gets to exit on its own.
const DEFAULT_GRACE: Duration = Duration::from_secs(2);

/// How long to wait for a Ctrl-C notification after the child's output ends.
/// A terminal Ctrl-C reaches ping directly too, and ping may finish before
/// the handler thread reports it.
const INTERRUPT_SETTLE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    Completed,
    Interrupted,
    SpawnFailed,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminationReason::Completed => "completed",
            TerminationReason::Interrupted => "interrupted",
            TerminationReason::SpawnFailed => "spawn failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    pub exit_code: i32,
    pub reason: TerminationReason,
}

/// Runs one native ping and tees its output.
pub struct Runner<W: Write> {
    console: W,
    verbosity: VerbosityLevel,
    interrupts: Receiver<()>,
    grace: Duration,
}

impl<W: Write> Runner<W> {
    pub fn new(console: W, verbosity: VerbosityLevel, interrupts: Receiver<()>) -> Self {
        Runner {
            console,
            verbosity,
            interrupts,
            grace: DEFAULT_GRACE,
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Spawns `command`, streams its output until it exits or an interrupt
    /// arrives, and returns how it ended.
    ///
    /// The log file is opened before spawning and closed on every path. When
    /// the spawn fails nothing is written to it.
    pub fn run(
        &mut self,
        command: &PlatformCommand,
        log: Option<&LogDestination>,
    ) -> Result<RunResult, PingError> {
        let log_file = log.map(LogDestination::open).transpose()?;
        if let Some(dest) = log {
            debug!(path = %dest.path.display(), mode = ?dest.mode, "log file opened");
        }
        let mut tee = Tee::new(&mut self.console, log_file, self.verbosity);

        let mut child = match spawn(command) {
            Ok(child) => child,
            Err(err) => {
                error!("{err}");
                tee.close()?;
                return Ok(RunResult {
                    exit_code: SPAWN_FAILED_EXIT_CODE,
                    reason: TerminationReason::SpawnFailed,
                });
            }
        };
        debug!(pid = child.id(), "spawned `{command}`");

        let result = pump(&mut child, &mut tee, &self.interrupts, self.grace, command);
        if let Err(err) = &result {
            error!("stopping ping after error: {err}");
            if let Err(err) = terminate(&mut child, self.grace) {
                warn!("failed to stop ping: {err}");
            }
        }

        let closed = tee.close();
        let result = result?;
        closed?;
        Ok(result)
    }
}

fn spawn(command: &PlatformCommand) -> Result<Child, PingError> {
    Command::new(&command.executable)
        .args(&command.arguments)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| PingError::SpawnFailed {
            executable: command.executable.clone(),
            source,
        })
}

fn pump<W: Write>(
    child: &mut Child,
    tee: &mut Tee<W>,
    interrupts: &Receiver<()>,
    grace: Duration,
    command: &PlatformCommand,
) -> Result<RunResult, PingError> {
    tee.note(format!("Pinging with: {command}"))?;

    let lines = read_lines(child);
    let closed = never();
    let mut watching = true;

    loop {
        let interrupt_rx = if watching { interrupts } else { &closed };
        select! {
            recv(lines) -> msg => match msg {
                Ok(line) => tee.write_line(&line)?,
                // both pipes hit EOF
                Err(_) => break,
            },
            recv(interrupt_rx) -> msg => match msg {
                Ok(()) => return interrupt(child, tee, &lines, grace),
                Err(_) => {
                    debug!("interrupt source closed");
                    watching = false;
                }
            },
        }
    }

    let status = child.wait()?;
    if watching && interrupts.recv_timeout(INTERRUPT_SETTLE).is_ok() {
        return interrupt(child, tee, &lines, grace);
    }
    let exit_code = exit_code(status);
    debug!(exit_code, "ping exited");
    tee.note(format!("Finished: completed (exit code {exit_code})"))?;

    Ok(RunResult {
        exit_code,
        reason: TerminationReason::Completed,
    })
}

fn interrupt<W: Write>(
    child: &mut Child,
    tee: &mut Tee<W>,
    lines: &Receiver<Line>,
    grace: Duration,
) -> Result<RunResult, PingError> {
    info!(pid = child.id(), "interrupt received");
    tee.note("Interrupted by user")?;

    let status = terminate(child, grace)?;

    // keep whatever the child printed on its way out, e.g. ping's summary
    let deadline = Instant::now() + grace;
    while let Ok(line) = lines.recv_deadline(deadline) {
        tee.write_line(&line)?;
    }

    tee.note(format!(
        "Finished: interrupted (ping exit code {})",
        exit_code(status)
    ))?;

    Ok(RunResult {
        exit_code: INTERRUPTED_EXIT_CODE,
        reason: TerminationReason::Interrupted,
    })
}

/// Moves both pipes into one channel, a reader thread per pipe. The channel
/// disconnects once both pipes are at EOF.
fn read_lines(child: &mut Child) -> Receiver<Line> {
    let (sender, receiver) = unbounded();
    if let Some(stdout) = child.stdout.take() {
        forward(stdout, Source::Stdout, sender.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        forward(stderr, Source::Stderr, sender);
    }
    receiver
}

fn forward<R: Read + Send + 'static>(pipe: R, source: Source, sender: Sender<Line>) {
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf);
                    let text = text.trim_end_matches(|c: char| c == '\n' || c == '\r');
                    if sender.send(Line::new(source, text)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!("failed to read ping {source}: {err}");
                    break;
                }
            }
        }
    });
}

/// Asks the child to stop, then kills it if it is still around after `grace`.
fn terminate(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    if let Some(status) = child.try_wait()? {
        return Ok(status);
    }

    #[cfg(unix)]
    {
        use wait_timeout::ChildExt;

        let pid = child.id();
        debug!(pid, "sending SIGINT");
        // SAFETY: the child has not been reaped yet so its pid is still ours.
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGINT);
        }

        if let Some(status) = child.wait_timeout(grace)? {
            return Ok(status);
        }
        warn!(pid, "ping still running after {grace:?}, killing it");
    }
    #[cfg(not(unix))]
    let _ = grace;

    match child.kill() {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::InvalidInput => {}
        Err(err) => return Err(err),
    }
    child.wait()
}

fn exit_code(status: ExitStatus) -> i32 {
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
    1
}

/// Interrupt source for the binary: Ctrl-C, SIGTERM and SIGHUP.
pub fn ctrl_channel() -> Result<Receiver<()>, ctrlc::Error> {
    let (sender, receiver) = bounded(100);
    ctrlc::set_handler(move || {
        let _ = sender.send(());
    })?;

    Ok(receiver)
}
