mod binding;
pub mod readiness;

pub use binding::{
    MountBinding, MountKind, MountMode, SKILLS_PREFIX, TICKET_PREFIX, WORKSPACE_PREFIX,
};
pub use readiness::{ensure_ready, ensure_ready_with, ReadinessOutcome};

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("mount `{virtual_prefix}` failed to become ready after {attempts} attempts: {reason}")]
    NotReady {
        virtual_prefix: String,
        attempts: u32,
        reason: String,
    },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
