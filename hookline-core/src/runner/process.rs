//! Process runner
//!
//! ProcessRunner executes a hook command through a shell, writes the event
//! payload to its stdin and collects its output. A command that outlives its
//! timeout gets a graceful termination signal, then a forceful kill once the
//! grace period has passed.
//!
//! On Unix each hook runs in its own process group and both signals go to the
//! whole group, so children started by the shell are stopped too. That holds
//! after the shell itself has exited: a background job still writing to the
//! hook's output pipes keeps the hook alive until its timeout.

use std::path::Path;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::traits::CommandRunner;
use crate::hooks::{EventPayload, ExitOutcome, HookCommand, HookResult};

/// Time between the termination signal and the forceful kill
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(5000);

/// Shell used to interpret hook commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Shell executable
    pub program: String,
    /// Arguments placed before the command string
    pub args: Vec<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        if cfg!(windows) {
            Self {
                program: "cmd".to_string(),
                args: vec!["/C".to_string()],
            }
        } else {
            Self {
                program: "sh".to_string(),
                args: vec!["-c".to_string()],
            }
        }
    }
}

/// Runs hook commands as OS processes
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    shell: ShellConfig,
    kill_grace: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(ShellConfig::default(), DEFAULT_KILL_GRACE)
    }
}

impl ProcessRunner {
    pub fn new(shell: ShellConfig, kill_grace: Duration) -> Self {
        Self { shell, kill_grace }
    }

    /// Build the process for `command` without spawning it
    pub fn build_command(&self, command: &HookCommand, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.shell.program);
        cmd.args(&self.shell.args).arg(command.command());

        if !cwd.as_os_str().is_empty() {
            cmd.current_dir(cwd);
        }

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }
    /// Drive the hook to completion, escalating from termination to kill on
    /// timeout or cancel
    ///
    /// A hook is complete once the shell has exited and both output pipes
    /// have closed. A background job that inherited the pipes keeps the hook
    /// running, so it is bound by the same timeout as the shell itself.
    async fn supervise<F>(
        &self,
        child: &mut Child,
        mut output: Pin<&mut F>,
        command: &HookCommand,
        cancel: &CancellationToken,
    ) -> ExitOutcome
    where
        F: Future<Output = ()>,
    {
        // Captured up front: the id is gone once the shell has been reaped,
        // but its process group may still be holding the pipes.
        let pgid = child.id();
        let mut progress = Progress::default();

        let interrupt = tokio::select! {
            biased;
            () = settle(child, output.as_mut(), &mut progress) => None,
            () = cancel.cancelled() => Some(Interrupt::Cancelled),
            () = tokio::time::sleep(command.timeout()) => Some(Interrupt::TimedOut),
        };

        match interrupt {
            None => return progress.outcome,
            Some(Interrupt::Cancelled) => {
                debug!(command = command.command(), "Dispatch cancelled, terminating hook");
                progress.outcome.cancelled = true;
            }
            Some(Interrupt::TimedOut) => {
                warn!(
                    command = command.command(),
                    timeout_ms = command.timeout().as_millis() as u64,
                    shell_exited = progress.exited,
                    "Hook timed out, terminating"
                );
                progress.outcome.timed_out = true;
            }
        }

        terminate(child, pgid);
        let graceful = tokio::time::timeout(
            self.kill_grace,
            settle(child, output.as_mut(), &mut progress),
        )
        .await;
        if graceful.is_ok() {
            return progress.outcome;
        }

        warn!(
            command = command.command(),
            grace_ms = self.kill_grace.as_millis() as u64,
            "Hook ignored termination, killing"
        );
        kill(child, pgid);

        // Anything outside the process group can still hold the pipes
        let drained = tokio::time::timeout(
            OUTPUT_DRAIN_LIMIT,
            settle(child, output.as_mut(), &mut progress),
        )
        .await;
        if drained.is_err() {
            warn!(
                command = command.command(),
                "Hook output still open after kill, keeping what was read"
            );
        }
        progress.outcome
    }
}

/// How long to keep reading output after the forceful kill
const OUTPUT_DRAIN_LIMIT: Duration = Duration::from_millis(500);

enum Interrupt {
    Cancelled,
    TimedOut,
}

#[derive(Default)]
struct Progress {
    outcome: ExitOutcome,
    exited: bool,
    drained: bool,
}

/// Wait until the shell has exited and `output` has read both pipes to EOF
async fn settle<F>(child: &mut Child, mut output: Pin<&mut F>, progress: &mut Progress)
where
    F: Future<Output = ()>,
{
    while !(progress.exited && progress.drained) {
        tokio::select! {
            status = child.wait(), if !progress.exited => {
                progress.outcome.code = exit_code(status);
                progress.exited = true;
            }
            () = output.as_mut(), if !progress.drained => progress.drained = true,
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        command: &HookCommand,
        payload: &EventPayload,
        cancel: &CancellationToken,
    ) -> HookResult {
        let started = Instant::now();

        let input = match serde_json::to_vec(payload) {
            Ok(input) => input,
            Err(e) => {
                warn!(command = command.command(), error = %e, "Failed to encode hook payload");
                return HookResult::failed(command.command(), e.to_string(), started.elapsed());
            }
        };

        let mut child = match self.build_command(command, &payload.cwd).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(command = command.command(), error = %e, "Failed to spawn hook");
                return HookResult::failed(command.command(), e.to_string(), started.elapsed());
            }
        };
        debug!(command = command.command(), pid = ?child.id(), "Hook started");

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();
        let outcome = {
            let output = async {
                tokio::join!(
                    write_input(stdin, &input),
                    read_stream(stdout, &mut stdout_buf),
                    read_stream(stderr, &mut stderr_buf),
                );
            };
            tokio::pin!(output);
            self.supervise(&mut child, output, command, cancel).await
        };

        let result = HookResult::from_exit(
            command.command(),
            outcome,
            &String::from_utf8_lossy(&stdout_buf),
            &String::from_utf8_lossy(&stderr_buf),
            started.elapsed(),
        );
        debug!(
            command = command.command(),
            exit_code = result.exit_code,
            timed_out = result.timed_out,
            duration_ms = result.duration.as_millis() as u64,
            "Hook finished"
        );
        result
    }
}

/// Write the payload and close stdin
async fn write_input(stdin: Option<ChildStdin>, input: &[u8]) {
    let Some(mut stdin) = stdin else {
        return;
    };
    if let Err(e) = stdin.write_all(input).await {
        // Hooks are free to exit without reading their input
        debug!(error = %e, "Hook did not consume its input");
    }
}

/// Append a stream to `buf` until EOF
///
/// Output lands in `buf` as it arrives, so a hook that is abandoned before
/// EOF still reports what it wrote.
async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>, buf: &mut Vec<u8>) {
    let Some(stream) = stream else {
        return;
    };

    let mut reader = BufReader::new(stream);
    loop {
        let chunk = match reader.fill_buf().await {
            Ok([]) => break,
            Ok(chunk) => chunk,
            Err(e) => {
                debug!(error = %e, "Error reading hook output");
                break;
            }
        };
        let len = chunk.len();
        buf.extend_from_slice(chunk);
        reader.consume(len);
    }
}

fn exit_code(status: std::io::Result<ExitStatus>) -> Option<i32> {
    match status {
        Ok(status) => status.code(),
        Err(e) => {
            warn!(error = %e, "Failed to wait for hook process");
            None
        }
    }
}

#[cfg(unix)]
fn terminate(_child: &mut Child, pgid: Option<u32>) {
    signal_group(pgid, libc::SIGTERM);
}

#[cfg(not(unix))]
fn terminate(child: &mut Child, _pgid: Option<u32>) {
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "Failed to terminate hook");
    }
}

fn kill(child: &mut Child, pgid: Option<u32>) {
    #[cfg(unix)]
    signal_group(pgid, libc::SIGKILL);
    #[cfg(not(unix))]
    let _ = pgid;

    if let Err(e) = child.start_kill() {
        debug!(error = %e, "Failed to kill hook");
    }
}

#[cfg(unix)]
fn signal_group(pgid: Option<u32>, signal: libc::c_int) {
    let Some(pgid) = pgid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };

    // SAFETY: kill(2) has no memory-safety preconditions. The negative pid
    // addresses the process group created for this child at spawn.
    if unsafe { libc::kill(-pgid, signal) } != 0 {
        debug!(
            pgid,
            signal,
            error = %std::io::Error::last_os_error(),
            "Failed to signal hook process group"
        );
    }
}
