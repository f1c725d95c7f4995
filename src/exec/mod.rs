mod runner;
mod sandbox;

pub use runner::run_process;
pub use sandbox::{build_sandbox_invocation, SandboxSpec, SANDBOX_BINARY};

use crate::config::ExecutorConfig;
use crate::shared::{append_event_log, now_secs};
use getrandom::getrandom;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const EXEC_SUFFIX_SPACE: u32 = 36 * 36 * 36 * 36;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub truncated: bool,
    pub wall_time_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("sandbox setup failed: {reason}")]
    SetupFailure { reason: String },
    #[error("command timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("command exited with status {exit_code}: {stderr}")]
    NonZeroExit { exit_code: i32, stderr: String },
    #[error("failed to generate execution id: {0}")]
    ExecutionId(String),
}

/// Runs agent commands inside an isolated view rooted at one
/// workspace's physical directory.
#[derive(Debug, Clone)]
pub struct Executor {
    workspace_root: PathBuf,
    state_root: PathBuf,
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(workspace_root: PathBuf, state_root: PathBuf, config: ExecutorConfig) -> Self {
        Self {
            workspace_root,
            state_root,
            config,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.config.default_timeout_secs)
    }

    pub fn run(&self, command: &str, timeout: Duration) -> Result<ExecutionResult, ExecError> {
        let execution_id = generate_execution_id(now_secs())?;
        let spec = build_sandbox_invocation(
            &self.workspace_root,
            command,
            &self.config.extra_read_only_binds,
        );
        append_event_log(
            &self.state_root,
            "info",
            "exec.start",
            &format!("{execution_id} command={command:?} launcher={}", spec.command_form()),
        );

        let Some(program) = which_sandbox() else {
            let err = ExecError::SetupFailure {
                reason: format!("sandbox launcher `{SANDBOX_BINARY}` not found on PATH"),
            };
            append_event_log(
                &self.state_root,
                "error",
                "exec.setup_failure",
                &format!("{execution_id}: {err}"),
            );
            return Err(err);
        };

        let raw = match run_process(&program, &spec.args, timeout, self.config.output_cap_bytes) {
            Ok(raw) => raw,
            Err(err) => {
                let (level, event) = match &err {
                    ExecError::Timeout { .. } => ("warn", "exec.timeout"),
                    _ => ("error", "exec.setup_failure"),
                };
                append_event_log(
                    &self.state_root,
                    level,
                    event,
                    &format!("{execution_id}: {err}"),
                );
                return Err(err);
            }
        };

        if raw.exit_code != 0 {
            append_event_log(
                &self.state_root,
                "warn",
                "exec.nonzero_exit",
                &format!(
                    "{execution_id} exit={} wall_time_ms={}",
                    raw.exit_code, raw.wall_time_ms
                ),
            );
            return Err(ExecError::NonZeroExit {
                exit_code: raw.exit_code,
                stderr: raw.stderr,
            });
        }

        append_event_log(
            &self.state_root,
            "info",
            "exec.complete",
            &format!("{execution_id} wall_time_ms={}", raw.wall_time_ms),
        );
        Ok(raw)
    }
}

pub fn generate_execution_id(now: i64) -> Result<String, ExecError> {
    let timestamp =
        u64::try_from(now).map_err(|_| ExecError::ExecutionId("negative timestamp".to_string()))?;
    let mut bytes = [0_u8; 4];
    getrandom(&mut bytes).map_err(|err| ExecError::ExecutionId(err.to_string()))?;
    let sample = u32::from_le_bytes(bytes) % EXEC_SUFFIX_SPACE;
    Ok(format!(
        "exec-{}-{}",
        base36_encode_u64(timestamp),
        base36_encode_fixed_u32(sample, 4)
    ))
}

fn base36_encode_u64(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut encoded = Vec::new();
    while value > 0 {
        encoded.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    encoded.reverse();
    String::from_utf8(encoded).unwrap_or_default()
}

fn base36_encode_fixed_u32(mut value: u32, width: usize) -> String {
    let mut encoded = vec![b'0'; width];
    for slot in encoded.iter_mut().rev() {
        *slot = BASE36_ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8(encoded).unwrap_or_default()
}

/// Resolves the sandbox launcher on the host. Missing launcher is a
/// setup failure, distinct from the user command failing.
pub fn sandbox_available() -> bool {
    which_sandbox().is_some()
}

pub(crate) fn which_sandbox() -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(SANDBOX_BINARY))
        .find(|candidate| candidate.is_file())
}

pub(crate) fn venv_activation(workspace_root: &Path) -> Option<String> {
    let activate = workspace_root.join(".venv/bin/activate");
    activate
        .is_file()
        .then(|| format!(". {}/.venv/bin/activate", crate::mounts::WORKSPACE_PREFIX))
}
