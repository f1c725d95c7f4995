use crate::exec::{ExecError, ExecutionResult};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);
const CAPTURE_CHUNK_BYTES: usize = 8 * 1024;

/// Spawns the launcher, captures both streams up to the byte cap, and
/// enforces the timeout by killing the process. Partial output of a
/// timed-out command is discarded in favor of the Timeout result.
pub fn run_process(
    program: &Path,
    args: &[String],
    timeout: Duration,
    output_cap_bytes: usize,
) -> Result<ExecutionResult, ExecError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|err| ExecError::SetupFailure {
        reason: format!("failed to spawn `{}`: {err}", program.display()),
    })?;

    let stdout = child.stdout.take().ok_or_else(|| ExecError::SetupFailure {
        reason: "missing stdout pipe".to_string(),
    })?;
    let stderr = child.stderr.take().ok_or_else(|| ExecError::SetupFailure {
        reason: "missing stderr pipe".to_string(),
    })?;

    let stdout_reader = thread::spawn(move || read_capped(stdout, output_cap_bytes));
    let stderr_reader = thread::spawn(move || read_capped(stderr, output_cap_bytes));

    let start = Instant::now();
    let exit_status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stdout_reader.join();
                    let _ = stderr_reader.join();
                    return Err(ExecError::Timeout {
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                thread::sleep(WAIT_POLL_INTERVAL);
            }
            Err(err) => {
                let _ = child.kill();
                return Err(ExecError::SetupFailure {
                    reason: format!("failed to wait for child: {err}"),
                });
            }
        }
    };
    let wall_time_ms = start.elapsed().as_millis() as u64;

    let (stdout, stdout_truncated) = stdout_reader.join().unwrap_or_default();
    let (stderr, stderr_truncated) = stderr_reader.join().unwrap_or_default();

    Ok(ExecutionResult {
        stdout,
        stderr,
        exit_code: exit_status.code().unwrap_or(-1),
        truncated: stdout_truncated || stderr_truncated,
        wall_time_ms,
    })
}

/// Reads to end of stream, keeping at most `cap` bytes. The remainder
/// is drained so the child never blocks on a full pipe.
fn read_capped(mut reader: impl Read, cap: usize) -> (String, bool) {
    let mut kept: Vec<u8> = Vec::new();
    let mut truncated = false;
    let mut chunk = [0_u8; CAPTURE_CHUNK_BYTES];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if kept.len() < cap {
                    let room = cap - kept.len();
                    kept.extend_from_slice(&chunk[..n.min(room)]);
                    if n > room {
                        truncated = true;
                    }
                } else {
                    truncated = true;
                }
            }
            Err(_) => break,
        }
    }
    (String::from_utf8_lossy(&kept).into_owned(), truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sh(args: &[&str]) -> (PathBuf, Vec<String>) {
        (
            PathBuf::from("/bin/sh"),
            args.iter().map(|arg| arg.to_string()).collect(),
        )
    }

    #[test]
    fn captures_stdout_of_successful_command() {
        let (program, args) = sh(&["-c", "echo hola mundo"]);
        let result =
            run_process(&program, &args, Duration::from_secs(5), 64 * 1024).expect("run");

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "hola mundo\n");
        assert!(!result.truncated);
    }

    #[test]
    fn nonzero_exit_keeps_full_stderr() {
        let (program, args) = sh(&["-c", "echo falla grave >&2; exit 3"]);
        let result =
            run_process(&program, &args, Duration::from_secs(5), 64 * 1024).expect("run");

        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stderr, "falla grave\n");
    }

    #[test]
    fn timeout_kills_the_process_and_discards_output() {
        let (program, args) = sh(&["-c", "echo partial; sleep 30"]);
        let start = Instant::now();
        let err = run_process(&program, &args, Duration::from_millis(200), 64 * 1024)
            .expect_err("must time out");

        assert!(matches!(err, ExecError::Timeout { timeout_ms: 200 }));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn output_beyond_the_cap_sets_truncated() {
        let (program, args) = sh(&["-c", "i=0; while [ $i -lt 500 ]; do echo aaaaaaaaaaaaaaaa; i=$((i+1)); done"]);
        let result = run_process(&program, &args, Duration::from_secs(10), 1024).expect("run");

        assert_eq!(result.exit_code, 0);
        assert!(result.truncated);
        assert!(result.stdout.len() <= 1024);
    }

    #[test]
    fn missing_launcher_is_a_setup_failure() {
        let err = run_process(
            Path::new("/nonexistent/launcher"),
            &[],
            Duration::from_secs(1),
            1024,
        )
        .expect_err("must fail");

        assert!(matches!(err, ExecError::SetupFailure { .. }));
    }
}
