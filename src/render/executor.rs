//! Renderer subprocess executor.
//!
//! Spawns the configured binary with the merged options and environment
//! overlay, feeds it the input, and waits with an optional timeout. Each call
//! runs exactly one process: `NotStarted -> Running -> {Succeeded, Failed, TimedOut}`.

use super::binary::check_binary;
use crate::config::{DocumentType, IoConvention, RenderOption, RendererConfig};
use crate::error::{Result, ShimError};
use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tempfile::TempPath;

/// First sleep between exit checks; doubles up to `MAX_POLL_INTERVAL`.
const INITIAL_POLL_INTERVAL: Duration = Duration::from_millis(5);
const MAX_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal state of a render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Succeeded,
    Failed,
    TimedOut,
}

impl RenderOutcome {
    /// Classify a failed render.
    pub fn from_error(err: &ShimError) -> Self {
        match err {
            ShimError::Timeout { .. } => RenderOutcome::TimedOut,
            _ => RenderOutcome::Failed,
        }
    }
}

/// Details of a completed render, for logging and the CLI.
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub doc_type: DocumentType,
    pub outcome: RenderOutcome,
    /// Exit code of the process (None if it was killed).
    pub exit_code: Option<i32>,
    pub duration: Duration,
    /// Size of the rendered output.
    pub bytes: usize,
    /// The command line that was executed, shell-quoted.
    pub command: String,
}

/// Rendered bytes plus the report describing how they were produced.
#[derive(Debug)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub report: RenderReport,
}

/// Render `input` with the configured binary and return its output.
///
/// `extra_options` are appended after the configured options; when a flag
/// repeats, which occurrence wins is up to the binary.
pub fn render(
    config: &RendererConfig,
    input: &[u8],
    extra_options: &[RenderOption],
) -> Result<Vec<u8>> {
    execute(config, input, extra_options).map(|output| output.bytes)
}

/// Like [`render`], but also returns a [`RenderReport`].
pub fn execute(
    config: &RendererConfig,
    input: &[u8],
    extra_options: &[RenderOption],
) -> Result<RenderOutput> {
    let program = check_binary(config)?;

    let mut args: Vec<OsString> = build_args(&config.options, extra_options)
        .into_iter()
        .map(OsString::from)
        .collect();

    let files = match config.io {
        IoConvention::Stdio => None,
        IoConvention::Files => {
            let files = TempFiles::create(config, input)?;
            args.push(files.input.as_os_str().to_owned());
            args.push(files.output.as_os_str().to_owned());
            Some(files)
        }
    };
    let command_line = display_command(&program, &args);

    let mut command = Command::new(&program);
    command
        .args(&args)
        .envs(&config.env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let stdin_input = match files {
        Some(_) => {
            command.stdin(Stdio::null());
            None
        }
        None => {
            command.stdin(Stdio::piped());
            Some(input.to_vec())
        }
    };
    // Own process group, so a timeout can kill everything the renderer forks.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    tracing::debug!(doc_type = %config.doc_type, command = %command_line, "spawning renderer");
    let start = Instant::now();
    let mut child = command.spawn().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => ShimError::BinaryNotFound {
            path: config.binary.clone(),
        },
        _ => ShimError::io(
            format!("failed to spawn renderer '{}'", program.display()),
            e,
        ),
    })?;

    let finished = supervise(&mut child, stdin_input, config.timeout)?;
    let duration = start.elapsed();

    let (status, stdin, stdout, stderr) = match finished {
        Finished::Completed {
            status,
            stdin,
            stdout,
            stderr,
        } => (status, stdin, stdout, stderr),
        Finished::TimedOut(timeout) => {
            tracing::warn!(
                doc_type = %config.doc_type,
                timeout_secs = timeout.as_secs_f64(),
                "renderer timed out and was terminated"
            );
            return Err(ShimError::Timeout { timeout });
        }
    };

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr).trim_end().to_string();
        tracing::debug!(doc_type = %config.doc_type, code = ?status.code(), "renderer failed");
        return Err(ShimError::NonZeroExit {
            code: status.code(),
            stderr,
        });
    }

    stdin.map_err(|e| ShimError::io("failed to write input to renderer stdin", e))?;
    let stdout = stdout.map_err(|e| ShimError::io("failed to read renderer stdout", e))?;

    let bytes = match &files {
        Some(files) => std::fs::read(&files.output).map_err(|e| {
            ShimError::io(
                format!("failed to read renderer output '{}'", files.output.display()),
                e,
            )
        })?,
        None => stdout,
    };

    tracing::info!(
        doc_type = %config.doc_type,
        bytes = bytes.len(),
        duration_ms = duration.as_millis() as u64,
        "render completed"
    );

    Ok(RenderOutput {
        report: RenderReport {
            doc_type: config.doc_type,
            outcome: RenderOutcome::Succeeded,
            exit_code: status.code(),
            duration,
            bytes: bytes.len(),
            command: command_line,
        },
        bytes,
    })
}

/// Flatten base options followed by extra options into an argument list.
pub fn build_args(base: &[RenderOption], extra: &[RenderOption]) -> Vec<String> {
    let mut args = Vec::new();
    for option in base.iter().chain(extra) {
        option.push_args(&mut args);
    }
    args
}

fn display_command(program: &Path, args: &[OsString]) -> String {
    let words: Vec<String> = std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|w| w.to_string_lossy().into_owned())
        .collect();
    shell_words::join(words)
}

enum Exit {
    Completed(ExitStatus),
    TimedOut(Duration),
}

enum Finished {
    Completed {
        status: ExitStatus,
        stdin: io::Result<()>,
        stdout: io::Result<Vec<u8>>,
        stderr: Vec<u8>,
    },
    TimedOut(Duration),
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    timeout: Duration,
    at: Instant,
}

/// Threads that feed stdin and drain stdout/stderr while the caller waits,
/// so a full pipe cannot deadlock either side.
///
/// They are detached rather than scoped: after a timeout nothing waits for
/// them, and they end once the killed processes release the pipes.
struct StreamThreads {
    writer: JoinHandle<io::Result<()>>,
    stdout: JoinHandle<io::Result<Vec<u8>>>,
    stderr: JoinHandle<io::Result<Vec<u8>>>,
}

impl StreamThreads {
    fn spawn(child: &mut Child, input: Option<Vec<u8>>) -> Self {
        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        Self {
            writer: thread::spawn(move || write_input(stdin, input.as_deref())),
            stdout: thread::spawn(move || read_stream(stdout)),
            stderr: thread::spawn(move || read_stream(stderr)),
        }
    }

    fn is_finished(&self) -> bool {
        self.writer.is_finished() && self.stdout.is_finished() && self.stderr.is_finished()
    }
}

/// Wait for the child and its streams, bounded by `timeout` as a whole.
fn supervise(
    child: &mut Child,
    input: Option<Vec<u8>>,
    timeout: Option<Duration>,
) -> Result<Finished> {
    let deadline = timeout.map(|timeout| Deadline {
        timeout,
        at: Instant::now() + timeout,
    });
    let streams = StreamThreads::spawn(child, input);

    let status = match wait_with_timeout(child, deadline)? {
        Exit::Completed(status) => status,
        Exit::TimedOut(timeout) => return Ok(Finished::TimedOut(timeout)),
    };

    // Processes the renderer forked can hold the pipes open after it exits.
    if let Some(deadline) = deadline
        && !wait_for_streams(&streams, deadline)
    {
        kill_process_group(child);
        return Ok(Finished::TimedOut(deadline.timeout));
    }

    let stderr = join(streams.stderr).unwrap_or_else(|e| {
        // Diagnostics only; a broken stderr pipe should not mask the exit status.
        tracing::debug!(error = %e, "failed to read renderer stderr");
        Vec::new()
    });
    Ok(Finished::Completed {
        status,
        stdin: join(streams.writer),
        stdout: join(streams.stdout),
        stderr,
    })
}

fn write_input(stdin: Option<ChildStdin>, input: Option<&[u8]>) -> io::Result<()> {
    let (Some(mut stdin), Some(input)) = (stdin, input) else {
        return Ok(());
    };
    match stdin.write_all(input) {
        // The binary exited or closed stdin without reading everything.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
    // Dropping stdin closes the pipe so the binary sees EOF.
}

fn read_stream<R: Read>(stream: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf)?;
    }
    Ok(buf)
}

fn join<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("renderer stream thread panicked")))
}

/// Wait for the child, killing it if the deadline passes first.
fn wait_with_timeout(child: &mut Child, deadline: Option<Deadline>) -> Result<Exit> {
    let Some(deadline) = deadline else {
        return child
            .wait()
            .map(Exit::Completed)
            .map_err(|e| ShimError::io("failed to wait for renderer", e));
    };

    let mut poll_interval = INITIAL_POLL_INTERVAL;

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Exit::Completed(status)),
            Ok(None) => {
                let now = Instant::now();
                if now >= deadline.at {
                    terminate(child)?;
                    return Ok(Exit::TimedOut(deadline.timeout));
                }
                thread::sleep(poll_interval.min(deadline.at - now));
                poll_interval = (poll_interval * 2).min(MAX_POLL_INTERVAL);
            }
            Err(e) => {
                terminate(child)?;
                return Err(ShimError::io("failed to check renderer status", e));
            }
        }
    }
}

/// Returns false if the streams are still open when the deadline passes.
fn wait_for_streams(streams: &StreamThreads, deadline: Deadline) -> bool {
    let mut poll_interval = INITIAL_POLL_INTERVAL;
    while !streams.is_finished() {
        let now = Instant::now();
        if now >= deadline.at {
            return false;
        }
        thread::sleep(poll_interval.min(deadline.at - now));
        poll_interval = (poll_interval * 2).min(MAX_POLL_INTERVAL);
    }
    true
}

/// Kill the child and everything it started, then reap it so no process
/// outlives the call.
fn terminate(child: &mut Child) -> Result<()> {
    kill_process_group(child);
    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "kill failed; renderer may have already exited");
    }
    child
        .wait()
        .map_err(|e| ShimError::io("failed to reap terminated renderer", e))?;
    Ok(())
}

/// SIGKILL the renderer's process group. The group id stays valid after the
/// leader is reaped, as long as any member is still running.
#[cfg(unix)]
fn kill_process_group(child: &Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: kill(2) only takes integers; a negative pid addresses the group.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        tracing::debug!(
            error = %io::Error::last_os_error(),
            "failed to kill renderer process group"
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

/// Input and output files for the `files` calling convention.
///
/// Both are deleted when dropped.
struct TempFiles {
    input: TempPath,
    output: TempPath,
}

impl TempFiles {
    fn create(config: &RendererConfig, input: &[u8]) -> Result<Self> {
        let dir: PathBuf = config
            .temporary_folder
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        std::fs::create_dir_all(&dir).map_err(|e| {
            ShimError::io(
                format!("failed to create temporary folder '{}'", dir.display()),
                e,
            )
        })?;

        let create = |prefix: &str, ext: &str| {
            tempfile::Builder::new()
                .prefix(prefix)
                .suffix(&suffix(ext))
                .tempfile_in(&dir)
                .map_err(|e| {
                    ShimError::io(
                        format!("failed to create temporary file in '{}'", dir.display()),
                        e,
                    )
                })
        };

        let mut input_file = create("render-shim-input-", &config.input_extension)?;
        input_file
            .write_all(input)
            .and_then(|()| input_file.flush())
            .map_err(|e| ShimError::io("failed to write renderer input file", e))?;

        let output_file = create("render-shim-output-", &config.output_extension)?;

        Ok(Self {
            input: input_file.into_temp_path(),
            output: output_file.into_temp_path(),
        })
    }
}

fn suffix(ext: &str) -> String {
    if ext.is_empty() {
        String::new()
    } else {
        format!(".{}", ext)
    }
}
