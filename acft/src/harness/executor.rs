//! Low-level command execution for harness commands

use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

use super::result::CommandResult;
use crate::error::{AcftError, Result};

/// Timeout for collecting output from child process pipes
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum captured output per stream (10MB)
const MAX_OUTPUT_SIZE: usize = 10 * 1024 * 1024;

/// Run one shell command, optionally bounded by `timeout`.
///
/// `env` entries are exported on top of the inherited environment.
pub fn run_command<K, V>(
    command: &str,
    working_dir: &Path,
    env: &[(K, V)],
    timeout: Option<Duration>,
) -> Result<CommandResult>
where
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let start = Instant::now();
    let mut child = spawn_shell_command(command, working_dir, env)?;

    // Drain the pipes while waiting so a chatty child cannot block on a full pipe.
    let (stdout_tx, stdout_rx) = mpsc::channel();
    let (stderr_tx, stderr_rx) = mpsc::channel();

    match child.stdout.take() {
        Some(stdout) => {
            thread::spawn(move || {
                let _ = stdout_tx.send(read_stream_to_string(stdout));
            });
        }
        None => {
            let _ = stdout_tx.send(String::new());
        }
    }
    match child.stderr.take() {
        Some(stderr) => {
            thread::spawn(move || {
                let _ = stderr_tx.send(read_stream_to_string(stderr));
            });
        }
        None => {
            let _ = stderr_tx.send(String::new());
        }
    }

    let status = wait(&mut child, timeout)
        .map_err(|e| AcftError::tool(format!("Failed to wait for command: {command}: {e}")))?;
    if status.is_none() {
        kill_child_process(&mut child);
    }
    let duration = start.elapsed();

    let stdout = stdout_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());
    let stderr = stderr_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());

    let result = match status {
        Some(status) => CommandResult {
            command: command.to_string(),
            success: status.success(),
            stdout,
            stderr,
            exit_code: status.code(),
            duration,
            timed_out: false,
        },
        None => {
            let secs = timeout.map(|t| t.as_secs()).unwrap_or_default();
            CommandResult {
                command: command.to_string(),
                success: false,
                stdout,
                stderr: format!("{stderr}\n[Process killed after {secs}s timeout]"),
                exit_code: None,
                duration,
                timed_out: true,
            }
        }
    };
    Ok(result)
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> std::io::Result<Option<ExitStatus>> {
    match timeout {
        Some(timeout) => child.wait_timeout(timeout),
        None => child.wait().map(Some),
    }
}

/// Spawn a shell command as a child process via `sh -c` (`cmd /C` on Windows).
fn spawn_shell_command<K, V>(command: &str, working_dir: &Path, env: &[(K, V)]) -> Result<Child>
where
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = if cfg!(target_family = "unix") {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    } else {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .current_dir(working_dir);
    for (key, value) in env {
        cmd.env(key, value);
    }

    cmd.spawn()
        .map_err(|e| AcftError::tool(format!("Failed to spawn command: {command}: {e}")))
}

/// Read a stream to string, capped at `MAX_OUTPUT_SIZE`.
fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                let to_copy = n.min(remaining);
                buf.extend_from_slice(&chunk[..to_copy]);
                if to_copy < n {
                    let mut discard = [0u8; 8192];
                    while stream.read(&mut discard).unwrap_or(0) > 0 {}
                    buf.extend_from_slice(b"\n[output truncated at 10MB]");
                    break;
                }
            }
            Err(_) => {
                if buf.is_empty() {
                    return "[error reading output]".to_string();
                }
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

fn kill_child_process(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
