use crate::config::ReadinessConfig;
use crate::mounts::{MountBinding, MountMode};
use crate::shared::append_event_log;
use std::fs;
use std::path::Path;
use std::time::Duration;

const WRITE_PROBE_FILE: &str = ".burrow-write-probe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessOutcome {
    Ready,
    TimedOut { attempts: u32, reason: String },
}

impl ReadinessOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

pub fn ensure_ready(
    binding: &MountBinding,
    config: &ReadinessConfig,
    state_root: &Path,
) -> ReadinessOutcome {
    let interval = Duration::from_millis(config.poll_interval_ms);
    ensure_ready_with(binding, config, state_root, probe_binding, |_| {
        std::thread::sleep(interval)
    })
}

pub fn ensure_ready_with(
    binding: &MountBinding,
    config: &ReadinessConfig,
    state_root: &Path,
    probe: impl Fn(&MountBinding) -> Result<(), String>,
    mut sleep: impl FnMut(u32),
) -> ReadinessOutcome {
    let prefix = binding.virtual_prefix();
    let mut last_reason = String::new();

    for attempt in 1..=config.max_attempts {
        match probe(binding) {
            Ok(()) => {
                append_event_log(
                    state_root,
                    "info",
                    "mount.ready",
                    &format!("{prefix} live after {attempt} attempt(s)"),
                );
                return ReadinessOutcome::Ready;
            }
            Err(reason) => {
                append_event_log(
                    state_root,
                    "warn",
                    "mount.ready.attempt",
                    &format!("{prefix} attempt {attempt}/{}: {reason}", config.max_attempts),
                );
                last_reason = reason;
            }
        }
        if attempt < config.max_attempts {
            sleep(attempt);
        }
    }

    append_event_log(
        state_root,
        "error",
        "mount.ready.timeout",
        &format!("{prefix} not ready after {} attempts", config.max_attempts),
    );
    ReadinessOutcome::TimedOut {
        attempts: config.max_attempts,
        reason: last_reason,
    }
}

fn probe_binding(binding: &MountBinding) -> Result<(), String> {
    let root = binding.physical_root();
    fs::read_dir(root).map_err(|err| format!("not listable: {err}"))?;

    if binding.mode() == MountMode::Writable {
        let probe_path = root.join(WRITE_PROBE_FILE);
        fs::write(&probe_path, b"probe").map_err(|err| format!("not writable: {err}"))?;
        fs::remove_file(&probe_path).map_err(|err| format!("probe cleanup failed: {err}"))?;
    }
    Ok(())
}
