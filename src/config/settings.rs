use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub workspaces_path: PathBuf,
    pub skills_path: PathBuf,
    #[serde(default)]
    pub tickets_path: Option<PathBuf>,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadinessConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutorConfig {
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,
    #[serde(default = "default_output_cap_bytes")]
    pub output_cap_bytes: usize,
    #[serde(default)]
    pub extra_read_only_binds: Vec<PathBuf>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_timeout_secs(),
            output_cap_bytes: default_output_cap_bytes(),
            extra_read_only_binds: Vec::new(),
        }
    }
}

fn default_max_attempts() -> u32 {
    6
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_output_cap_bytes() -> usize {
    256 * 1024
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.workspaces_path.is_absolute() {
            return Err(ConfigError::Settings(
                "workspaces_path must be absolute".to_string(),
            ));
        }
        if !self.skills_path.is_absolute() {
            return Err(ConfigError::Settings(
                "skills_path must be absolute".to_string(),
            ));
        }
        if let Some(tickets_path) = &self.tickets_path {
            if !tickets_path.is_absolute() {
                return Err(ConfigError::Settings(
                    "tickets_path must be absolute".to_string(),
                ));
            }
        }
        if self.readiness.max_attempts == 0 {
            return Err(ConfigError::Settings(
                "readiness.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.executor.default_timeout_secs == 0 {
            return Err(ConfigError::Settings(
                "executor.default_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.executor.output_cap_bytes == 0 {
            return Err(ConfigError::Settings(
                "executor.output_cap_bytes must be at least 1".to_string(),
            ));
        }
        for bind in &self.executor.extra_read_only_binds {
            if !bind.is_absolute() {
                return Err(ConfigError::Settings(format!(
                    "executor.extra_read_only_binds entry `{}` must be absolute",
                    bind.display()
                )));
            }
        }
        Ok(())
    }
}
